use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Duration;
use tempfile::tempdir;

use detailer_app::app::{
    AnalysisService, AssessmentService, HistoryFilter, InsightService, InsightSettings,
    PricingService,
};
use detailer_app::repository::Repositories;
use detailer_domain::service::SimilarityQuery;
use detailer_types::{
    AssessmentSubmission, Caller, Error, PricingModel, Role, ServiceItem, SimilarityMethod,
    Trend, VehicleAnalysis, VehicleClass,
};
use detailer_vision::{AnalysisError, AnalysisRequest, VehicleAnalyzer};

struct Fixture {
    repos: Repositories,
    pricing: PricingService,
    assessments: AssessmentService,
    insights: InsightService,
}

fn fixture(repos: Repositories) -> Fixture {
    Fixture {
        pricing: PricingService::new(repos.pricing.clone()),
        assessments: AssessmentService::new(repos.pricing.clone(), repos.assessments.clone()),
        insights: InsightService::new(
            repos.pricing.clone(),
            repos.assessments.clone(),
            InsightSettings::default(),
        ),
        repos,
    }
}

fn admin() -> Caller {
    Caller::admin("owner@shop")
}

fn customer(subject: &str) -> Caller {
    Caller::new(subject, Role::Customer)
}

fn submission(class: VehicleClass, interior: i32, exterior: i32, services: &[&str]) -> AssessmentSubmission {
    AssessmentSubmission {
        client_name: "Robin".to_string(),
        images: vec!["photos/1.jpg".to_string()],
        vehicle_class: class,
        interior_condition: interior,
        exterior_condition: exterior,
        description: String::new(),
        services: services.iter().map(|s| s.to_string()).collect(),
    }
}

fn wash_model() -> PricingModel {
    let mut model = PricingModel::default();
    model.services.insert("wash".into(), ServiceItem::new("Wash", 20.0));
    model
}

#[test]
fn submit_requires_a_model() {
    let f = fixture(Repositories::in_memory());
    let err = f
        .assessments
        .submit(&customer("c1"), &submission(VehicleClass::Sedan, 80, 70, &[]))
        .unwrap_err();
    assert!(matches!(err, Error::ModelNotFound));
}

#[test]
fn quote_and_submission_lock_in_the_same_price() {
    let f = fixture(Repositories::in_memory());
    f.pricing.replace(&admin(), wash_model(), None).unwrap();

    let quote = f
        .pricing
        .estimate(VehicleClass::Sedan, 80, 70, &["wash"])
        .unwrap();
    assert_eq!(quote, 101);

    let stored = f
        .assessments
        .submit(&customer("c1"), &submission(VehicleClass::Sedan, 80, 70, &["wash"]))
        .unwrap();
    assert_eq!(stored.estimated_price, 101);
    assert_eq!(stored.owner_id, "c1");

    // A later model change leaves the stored estimate alone
    let mut pricier = wash_model();
    pricier.base_price.insert(VehicleClass::Sedan, 500.0);
    f.pricing.replace(&admin(), pricier, Some(1)).unwrap();
    assert_eq!(f.assessments.get(&stored.id).unwrap().estimated_price, 101);
}

#[test]
fn replace_validates_and_versions() {
    let f = fixture(Repositories::in_memory());
    let mut broken = PricingModel::default();
    broken.base_price.remove(&VehicleClass::Truck);

    let err = f.pricing.replace(&admin(), broken, None).unwrap_err();
    assert_eq!(err.violations()[0].field, "basePrice.truck");
    assert!(f.repos.pricing.current().unwrap().is_none());

    let v1 = f.pricing.replace(&admin(), PricingModel::default(), None).unwrap();
    let v2 = f.pricing.replace(&admin(), PricingModel::default(), Some(v1.version)).unwrap();
    assert_eq!((v1.version, v2.version), (1, 2));
    assert_eq!(v2.updated_by, "owner@shop");

    let stale = f.pricing.replace(&admin(), PricingModel::default(), Some(1));
    assert!(matches!(
        stale,
        Err(Error::Conflict {
            expected: Some(1),
            actual: Some(2)
        })
    ));

    assert!(matches!(
        f.pricing.replace(&customer("c1"), PricingModel::default(), Some(2)),
        Err(Error::Unauthorized)
    ));
}

#[test]
fn edit_based_on_an_old_version_is_rejected_across_handles() {
    let dir = tempdir().unwrap();
    let first = fixture(Repositories::open_at(dir.path().to_path_buf()).unwrap());
    let second = fixture(Repositories::open_at(dir.path().to_path_buf()).unwrap());

    let exported = first.pricing.initialize(&admin()).unwrap();
    assert_eq!(exported.version, 1);

    let mut theirs = PricingModel::default();
    theirs.labor_cost = 40.0;
    let replaced = second
        .pricing
        .replace(&Caller::admin("other@shop"), theirs.clone(), Some(1))
        .unwrap();
    assert_eq!(replaced.version, 2);

    let mut mine = exported.model.clone();
    mine.material_cost = 12.0;
    let stale = first.pricing.replace(&admin(), mine, Some(exported.version));
    assert!(matches!(
        stale,
        Err(Error::Conflict {
            expected: Some(1),
            actual: Some(2)
        })
    ));

    let stored = first.pricing.current().unwrap();
    assert_eq!(stored.version, 2);
    assert_eq!(stored.model, theirs);
}

#[test]
fn concurrent_replacements_through_the_service() {
    let dir = tempdir().unwrap();
    let f = fixture(Repositories::open_at(dir.path().to_path_buf()).unwrap());
    let base = f.pricing.initialize(&admin()).unwrap();

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let pricing = f.pricing.clone();
            std::thread::spawn(move || {
                let mut model = PricingModel::default();
                model.material_cost = f64::from(i);
                pricing.replace(&admin(), model, Some(base.version))
            })
        })
        .collect();

    let outcomes: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(outcomes.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(outcomes
        .iter()
        .filter_map(|r| r.as_ref().err())
        .all(|e| e.is_retryable()));
    assert_eq!(f.pricing.current().unwrap().version, 2);
}

#[test]
fn feedback_is_write_once_and_drives_accuracy() {
    let f = fixture(Repositories::in_memory());
    f.pricing.initialize(&admin()).unwrap();

    let a = f
        .assessments
        .submit(&customer("c1"), &submission(VehicleClass::Van, 100, 100, &[]))
        .unwrap();
    let b = f
        .assessments
        .submit(&customer("c2"), &submission(VehicleClass::Van, 100, 100, &[]))
        .unwrap();
    assert_eq!(a.estimated_price, 75);

    f.assessments.record_actual_price(&a.id, 80.0).unwrap();
    f.assessments.record_actual_price(&b.id, 120.0).unwrap();
    assert!(matches!(
        f.assessments.record_actual_price(&a.id, 75.0),
        Err(Error::AlreadyRecorded { .. })
    ));
    assert!(matches!(
        f.assessments.record_actual_price("nope", 75.0),
        Err(Error::NotFound(_))
    ));

    let snapshot = f.insights.accuracy().unwrap();
    assert_eq!(snapshot.total_assessments, 2);
    assert_eq!(snapshot.accurate_assessments, 1);
    assert!((snapshot.accuracy - 50.0).abs() < 1e-9);

    let by_class = f.insights.accuracy_by_class().unwrap();
    assert_eq!(by_class[&VehicleClass::Van].total_assessments, 2);
    assert_eq!(f.insights.accuracy_samples().unwrap().len(), 2);
}

#[test]
fn insights_use_the_owners_latest_assessment() {
    let f = fixture(Repositories::in_memory());

    assert!(f.insights.insights_for_owner("c1").unwrap().is_empty());

    let mut model = PricingModel::default();
    model.services.clear();
    model.services.insert("wash".into(), ServiceItem::new("Wash", 20.0));
    model.services.insert("wax".into(), ServiceItem::new("Wax", 40.0));
    f.pricing.replace(&admin(), model, None).unwrap();

    f.assessments
        .submit(&customer("c1"), &submission(VehicleClass::Suv, 60, 60, &["wash", "wax"]))
        .unwrap();
    f.assessments
        .submit(&customer("c2"), &submission(VehicleClass::Suv, 60, 60, &["wash"]))
        .unwrap();

    let insights = f.insights.insights_for_owner("c1").unwrap();
    assert_eq!(
        insights.recommendations,
        vec![
            "Adjust price for wash to $21 to stay competitive.",
            "Adjust price for wax to $38 to stay competitive.",
        ]
    );
    assert_eq!(insights.trend_analysis["pricing"].trend, Trend::Stable);
}

#[test]
fn similar_and_history_queries() {
    let f = fixture(Repositories::in_memory());
    f.pricing.initialize(&admin()).unwrap();

    let near = f
        .assessments
        .submit(&customer("c1"), &submission(VehicleClass::Sedan, 75, 85, &[]))
        .unwrap();
    let far = f
        .assessments
        .submit(&customer("c1"), &submission(VehicleClass::Sedan, 20, 30, &[]))
        .unwrap();
    f.assessments
        .submit(&customer("c2"), &submission(VehicleClass::Truck, 80, 80, &[]))
        .unwrap();

    let query = SimilarityQuery::new(VehicleClass::Sedan, 80, 80).unwrap();
    let threshold = f.insights.similar(&query, None, None).unwrap();
    assert_eq!(threshold.len(), 1);
    assert_eq!(threshold[0].assessment.id, near.id);

    let embedding = f
        .insights
        .similar(&query, Some(2), Some(SimilarityMethod::Embedding))
        .unwrap();
    assert_eq!(embedding.len(), 2);
    assert_eq!(embedding[0].assessment.id, near.id);
    assert!(embedding[0].distance.is_some());

    let peers = f.insights.similar_to(&far.id, None, Some(SimilarityMethod::Embedding)).unwrap();
    assert!(peers.iter().all(|p| p.assessment.id != far.id));
    assert!(matches!(
        f.insights.similar(&query, Some(0), None),
        Err(Error::InvalidInput(_))
    ));

    let mine = f.assessments.history(&HistoryFilter::for_owner("c1")).unwrap();
    assert_eq!(mine.len(), 2);
    let trucks = f
        .assessments
        .history(&HistoryFilter {
            vehicle_class: Some(VehicleClass::Truck),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(trucks.len(), 1);

    f.assessments.record_actual_price(&near.id, 60.0).unwrap();
    let pending = f
        .assessments
        .history(&HistoryFilter {
            pending_only: true,
            limit: Some(1),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(pending.len(), 1);
    assert!(pending[0].actual_price.is_none());
}

#[test]
fn analytics_cover_the_trailing_window() {
    let f = fixture(Repositories::in_memory());
    f.pricing.initialize(&admin()).unwrap();
    let a = f
        .assessments
        .submit(&customer("c1"), &submission(VehicleClass::Sedan, 100, 100, &["waxing"]))
        .unwrap();

    let now = a.created_at + Duration::days(1);
    let analytics = f.insights.analytics_at(now, None).unwrap();
    assert_eq!(analytics.assessment_count, 1);
    assert_eq!(analytics.window_days, 30);
    assert_eq!(analytics.popular_services, vec!["waxing"]);

    let later = a.created_at + Duration::days(45);
    assert_eq!(f.insights.analytics_at(later, None).unwrap().assessment_count, 0);
}

struct StubAnalyzer {
    calls: AtomicUsize,
    fail: bool,
}

#[async_trait]
impl VehicleAnalyzer for StubAnalyzer {
    async fn analyze(&self, request: &AnalysisRequest) -> Result<VehicleAnalysis, AnalysisError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(AnalysisError::EmptyOutput);
        }
        Ok(VehicleAnalysis {
            body_type: request.vehicle_class.to_string(),
            damage_areas: vec!["door".to_string()],
            cleanliness_level: "dirty".to_string(),
            recommended_services: vec!["waxing".to_string()],
            confidence_score: 0.6,
        })
    }
}

#[tokio::test]
async fn analysis_is_attached_once_and_keeps_the_price() {
    let f = fixture(Repositories::in_memory());
    f.pricing.initialize(&admin()).unwrap();
    let a = f
        .assessments
        .submit(&customer("c1"), &submission(VehicleClass::Suv, 50, 50, &[]))
        .unwrap();

    let stub = Arc::new(StubAnalyzer {
        calls: AtomicUsize::new(0),
        fail: false,
    });
    let service = AnalysisService::new(f.repos.assessments.clone(), stub.clone());

    let updated = service.analyze_assessment(&a.id).await.unwrap();
    assert_eq!(updated.analysis.as_ref().unwrap().body_type, "suv");
    assert_eq!(updated.estimated_price, a.estimated_price);

    assert!(matches!(
        service.analyze_assessment(&a.id).await,
        Err(Error::AlreadyRecorded { .. })
    ));
    assert_eq!(stub.calls.load(Ordering::SeqCst), 1);

    assert!(matches!(
        service.analyze_assessment("missing").await,
        Err(Error::NotFound(_))
    ));
}

#[tokio::test]
async fn analyzer_failure_is_unavailable_and_leaves_record() {
    let f = fixture(Repositories::in_memory());
    f.pricing.initialize(&admin()).unwrap();
    let a = f
        .assessments
        .submit(&customer("c1"), &submission(VehicleClass::Suv, 50, 50, &[]))
        .unwrap();

    let service = AnalysisService::new(
        f.repos.assessments.clone(),
        Arc::new(StubAnalyzer {
            calls: AtomicUsize::new(0),
            fail: true,
        }),
    );
    assert!(matches!(
        service.analyze_assessment(&a.id).await,
        Err(Error::AnalysisUnavailable(_))
    ));

    let stored = f.assessments.get(&a.id).unwrap();
    assert!(stored.analysis.is_none());
    assert_eq!(stored.estimated_price, a.estimated_price);
}

#[test]
fn missing_analyzer_command_is_reported() {
    let repos = Repositories::in_memory();
    let config = detailer_app::config::Config::default();
    assert!(matches!(
        AnalysisService::from_config(&config, repos.assessments),
        Err(Error::AnalysisUnavailable(_))
    ));
}
