//! Parsing analyzer output

use detailer_types::VehicleAnalysis;

use crate::analyzer::AnalysisError;

/// Extract JSON from response (handles markdown code blocks and chatter)
pub fn extract_json_from_response(response: &str) -> String {
    let response = response.trim();

    if response.starts_with("```") {
        if let Some(end) = response.rfind("```") {
            let start = response.find('\n').map(|i| i + 1).unwrap_or(3);
            if start < end {
                return response[start..end].trim().to_string();
            }
        }
    }

    if let Some(start) = response.find('{') {
        if let Some(end) = response.rfind('}') {
            if start < end {
                return response[start..=end].to_string();
            }
        }
    }

    response.to_string()
}

/// Parse and sanity-check an analyzer response
pub fn parse_analysis(response: &str) -> Result<VehicleAnalysis, AnalysisError> {
    if response.trim().is_empty() {
        return Err(AnalysisError::EmptyOutput);
    }

    let json_str = extract_json_from_response(response);
    let analysis: VehicleAnalysis = serde_json::from_str(&json_str).map_err(|e| {
        let truncated: String = response.chars().take(200).collect();
        AnalysisError::Parse(format!("{} | raw: {}", e, truncated))
    })?;

    if !(0.0..=1.0).contains(&analysis.confidence_score) {
        return Err(AnalysisError::Parse(format!(
            "confidence score out of range: {}",
            analysis.confidence_score
        )));
    }
    Ok(analysis)
}
