//! Command implementations

use std::path::PathBuf;

use detailer_app::app::{
    AnalysisService, AssessmentService, HistoryFilter, InsightService, InsightSettings,
    PricingService,
};
use detailer_app::config::Config;
use detailer_app::repository::Repositories;
use detailer_domain::service::SimilarityQuery;
use detailer_infra::export::export_assessments_csv;
use detailer_infra::model_file::load_pricing_model;
use detailer_types::{
    AssessmentSubmission, Caller, Error, OutputFormat, Result, SimilarityMethod, VehicleClass,
};

use tracing::debug;

use crate::cli::{Cli, Commands, ModelCommand, VehicleArgs};
use crate::output;

/// Everything a command needs after config and flags are resolved
struct Context {
    config: Config,
    caller: Caller,
    format: OutputFormat,
    repos: Repositories,
}

impl Context {
    fn pricing(&self) -> PricingService {
        PricingService::new(self.repos.pricing.clone())
    }

    fn assessments(&self) -> AssessmentService {
        AssessmentService::new(self.repos.pricing.clone(), self.repos.assessments.clone())
    }

    fn insights(&self) -> InsightService {
        InsightService::new(
            self.repos.pricing.clone(),
            self.repos.assessments.clone(),
            InsightSettings::from_config(&self.config),
        )
    }
}

/// Identity used when `--as` is not given
fn default_subject() -> String {
    std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "anonymous".to_string())
}

pub fn execute(cli: Cli) -> Result<()> {
    // Load config
    let mut config = Config::load()?;

    if let Commands::Config {
        show,
        set_store_dir,
        set_output,
        set_strategy,
        set_similar_limit,
        set_window_days,
        add_admin,
        remove_admin,
        add_operator,
        set_analyzer_cmd,
        set_analyzer_timeout,
        reset,
    } = cli.command
    {
        return cmd_config(ConfigUpdate {
            show,
            set_store_dir,
            set_output,
            set_strategy,
            set_similar_limit,
            set_window_days,
            add_admin,
            remove_admin,
            add_operator,
            set_analyzer_cmd,
            set_analyzer_timeout,
            reset,
        });
    }

    // Override from CLI args
    if let Some(dir) = cli.store_dir {
        config.store_dir = Some(dir);
    }
    let format = cli.format.unwrap_or(config.output_format);
    let subject = cli.subject.unwrap_or_else(default_subject);
    let caller = config.caller_for(&subject);
    let repos = Repositories::open(&config)?;
    debug!(subject = %caller.subject, role = %caller.role, "resolved caller");

    let ctx = Context {
        config,
        caller,
        format,
        repos,
    };

    match cli.command {
        Commands::Quote {
            vehicle,
            services,
            breakdown,
        } => cmd_quote(&ctx, &vehicle, &services, breakdown),
        Commands::Submit {
            client,
            vehicle,
            images,
            services,
            description,
        } => cmd_submit(
            &ctx,
            AssessmentSubmission {
                client_name: client,
                images,
                vehicle_class: vehicle.class,
                interior_condition: vehicle.interior,
                exterior_condition: vehicle.exterior,
                description,
                services,
            },
        ),
        Commands::Feedback { id, actual } => cmd_feedback(&ctx, &id, actual),
        Commands::Analyze { id } => cmd_analyze(&ctx, &id),
        Commands::Show { id } => {
            let assessment = ctx.assessments().get(&id)?;
            output::output_assessment(ctx.format, &assessment)
        }
        Commands::History {
            owner,
            mine,
            class,
            pending,
            limit,
        } => {
            let owner = if mine {
                Some(ctx.caller.subject.clone())
            } else {
                owner
            };
            cmd_history(&ctx, owner, class, pending, limit)
        }
        Commands::Model { action } => cmd_model(&ctx, action),
        Commands::Insights { owner } => {
            let owner = owner.unwrap_or_else(|| ctx.caller.subject.clone());
            let insights = ctx.insights().insights_for_owner(&owner)?;
            output::output_insights(ctx.format, &owner, &insights)
        }
        Commands::Accuracy { by_class, detailed } => cmd_accuracy(&ctx, by_class, detailed),
        Commands::Similar {
            to,
            class,
            interior,
            exterior,
            limit,
            strategy,
        } => cmd_similar(&ctx, to, class, interior, exterior, limit, strategy),
        Commands::Analytics { days } => {
            let analytics = ctx.insights().analytics(days)?;
            output::output_analytics(ctx.format, &analytics)
        }
        Commands::Export { output } => cmd_export(&ctx, output),
        Commands::Config { .. } => Ok(()),
    }
}

fn cmd_quote(
    ctx: &Context,
    vehicle: &VehicleArgs,
    services: &[String],
    breakdown: bool,
) -> Result<()> {
    let pricing = ctx.pricing();
    if breakdown {
        let b = pricing.breakdown(vehicle.class, vehicle.interior, vehicle.exterior, services)?;
        output::output_breakdown(ctx.format, &b)
    } else {
        let price = pricing.estimate(vehicle.class, vehicle.interior, vehicle.exterior, services)?;
        output::output_quote(ctx.format, vehicle.class, price)
    }
}

fn cmd_submit(ctx: &Context, submission: AssessmentSubmission) -> Result<()> {
    let assessment = ctx.assessments().submit(&ctx.caller, &submission)?;
    output::output_assessment(ctx.format, &assessment)
}

fn cmd_feedback(ctx: &Context, id: &str, actual: f64) -> Result<()> {
    let assessment = ctx.assessments().record_actual_price(id, actual)?;
    output::output_feedback(ctx.format, &assessment)
}

fn cmd_analyze(ctx: &Context, id: &str) -> Result<()> {
    let service = AnalysisService::from_config(&ctx.config, ctx.repos.assessments.clone())?;
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let assessment = runtime.block_on(service.analyze_assessment(id))?;
    output::output_assessment(ctx.format, &assessment)
}

fn cmd_history(
    ctx: &Context,
    owner: Option<String>,
    class: Option<VehicleClass>,
    pending: bool,
    limit: usize,
) -> Result<()> {
    let filter = HistoryFilter {
        owner_id: owner,
        vehicle_class: class,
        pending_only: pending,
        limit: Some(limit),
    };
    let entries = ctx.assessments().history(&filter)?;
    output::output_history(ctx.format, &entries)
}

fn cmd_model(ctx: &Context, action: ModelCommand) -> Result<()> {
    let pricing = ctx.pricing();
    match action {
        ModelCommand::Show => {
            let record = pricing.current()?;
            output::output_model(ctx.format, &record)
        }
        ModelCommand::Init => {
            let record = pricing.initialize(&ctx.caller)?;
            output::output_model(ctx.format, &record)
        }
        ModelCommand::Set {
            file,
            expected_version,
            create,
        } => {
            let model = load_pricing_model(&file)?;
            let expected = match (create, expected_version) {
                (true, _) => None,
                (false, Some(v)) => Some(v),
                (false, None) => {
                    return Err(Error::InvalidInput(
                        "--expected-version is required unless --create is given".to_string(),
                    ))
                }
            };
            let record = pricing.replace(&ctx.caller, model, expected)?;
            output::output_model(ctx.format, &record)
        }
    }
}

fn cmd_accuracy(ctx: &Context, by_class: bool, detailed: bool) -> Result<()> {
    let insights = ctx.insights();
    let overall = insights.accuracy()?;
    let grouped = if by_class {
        Some(insights.accuracy_by_class()?)
    } else {
        None
    };
    let samples = if detailed {
        Some(insights.accuracy_samples()?)
    } else {
        None
    };
    output::output_accuracy(ctx.format, &overall, grouped.as_ref(), samples.as_deref())
}

fn cmd_similar(
    ctx: &Context,
    to: Option<String>,
    class: Option<VehicleClass>,
    interior: Option<i32>,
    exterior: Option<i32>,
    limit: Option<usize>,
    strategy: Option<SimilarityMethod>,
) -> Result<()> {
    let insights = ctx.insights();
    let method = strategy.unwrap_or(insights.settings().similarity_method);
    let matches = match (to, class, interior, exterior) {
        (Some(id), _, _, _) => insights.similar_to(&id, limit, Some(method))?,
        (None, Some(class), Some(interior), Some(exterior)) => {
            let query = SimilarityQuery::new(class, interior, exterior)?;
            insights.similar(&query, limit, Some(method))?
        }
        _ => {
            return Err(Error::InvalidInput(
                "either --to or --class, --interior and --exterior are required".to_string(),
            ))
        }
    };
    output::output_similar(ctx.format, method, &matches)
}

fn cmd_export(ctx: &Context, path: PathBuf) -> Result<()> {
    let assessments = ctx.assessments().history(&HistoryFilter::default())?;
    let count = export_assessments_csv(&path, &assessments)?;
    println!("Exported {} assessments to {}", count, path.display());
    Ok(())
}

/// Flags of the `config` command
struct ConfigUpdate {
    show: bool,
    set_store_dir: Option<PathBuf>,
    set_output: Option<OutputFormat>,
    set_strategy: Option<SimilarityMethod>,
    set_similar_limit: Option<usize>,
    set_window_days: Option<u32>,
    add_admin: Option<String>,
    remove_admin: Option<String>,
    add_operator: Option<String>,
    set_analyzer_cmd: Option<String>,
    set_analyzer_timeout: Option<u64>,
    reset: bool,
}

fn cmd_config(update: ConfigUpdate) -> Result<()> {
    if update.reset {
        let config = Config::default();
        config.save()?;
        println!("Configuration reset to defaults");
        println!("\n{}", config);
        return Ok(());
    }

    let mut config = Config::load()?;
    let mut modified = false;

    if let Some(dir) = update.set_store_dir {
        config.store_dir = Some(dir);
        modified = true;
    }

    if let Some(output_format) = update.set_output {
        config.output_format = output_format;
        modified = true;
    }

    if let Some(strategy) = update.set_strategy {
        config.similarity_strategy = strategy;
        modified = true;
    }

    if let Some(limit) = update.set_similar_limit {
        if limit == 0 {
            return Err(Error::InvalidInput(
                "similar limit must be positive".to_string(),
            ));
        }
        config.similar_limit = limit;
        modified = true;
    }

    if let Some(days) = update.set_window_days {
        config.analytics_window_days = days;
        modified = true;
    }

    if let Some(admin) = update.add_admin {
        let admin = admin.trim().to_string();
        if !config.admins.contains(&admin) {
            config.admins.push(admin);
        }
        modified = true;
    }

    if let Some(admin) = update.remove_admin {
        config.admins.retain(|a| a != admin.trim());
        modified = true;
    }

    if let Some(operator) = update.add_operator {
        let operator = operator.trim().to_string();
        if !config.operators.contains(&operator) {
            config.operators.push(operator);
        }
        modified = true;
    }

    if let Some(cmd) = update.set_analyzer_cmd {
        config.analyzer_command = if cmd.trim().is_empty() { None } else { Some(cmd) };
        modified = true;
    }

    if let Some(secs) = update.set_analyzer_timeout {
        config.analyzer_timeout_secs = secs;
        modified = true;
    }

    if modified {
        config.save()?;
        println!("Configuration updated");
    }

    if update.show || !modified {
        println!("{}", config);
    }

    Ok(())
}
