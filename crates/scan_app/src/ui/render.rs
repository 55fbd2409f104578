use scan_core::AppViewModel;

use super::constants::{APP_TITLE, RESULTS_HEADING};

pub fn render(view: &AppViewModel) -> String {
    let mut lines = Vec::new();

    lines.push(format!("== {APP_TITLE} =="));
    if view.base_url.is_empty() {
        lines.push("Base URL: (required)".to_string());
    } else {
        lines.push(format!("Base URL: {}", view.base_url));
    }

    lines.push("Endpoints:".to_string());
    for (row, endpoint) in view.endpoints.iter().enumerate() {
        lines.push(format!("  [{row}] {endpoint}"));
    }

    if view.submit_enabled {
        lines.push(format!("[ {} ]", view.submit_label));
    } else if view.cancel_enabled {
        lines.push(format!("[ {} ] (disabled, `cancel` to abandon)", view.submit_label));
    } else {
        lines.push(format!("[ {} ] (disabled)", view.submit_label));
    }

    if let Some(error) = &view.error {
        lines.push(format!("Scan failed ({}): {}", error.category, error.message));
    }

    if let Some(results) = &view.results_text {
        lines.push(String::new());
        lines.push(RESULTS_HEADING.to_string());
        lines.push(results.clone());
    }

    lines.push(String::new());
    lines.join("\n")
}
