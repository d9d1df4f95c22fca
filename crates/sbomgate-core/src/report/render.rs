use crate::report::model::Report;

pub fn render_text(report: &Report) -> String {
    let mut out = String::new();
    out.push_str(&format!("{} {}\n", report.tool.name, report.tool.version));
    out.push_str(&format!("Subject: {}\n", report.subject));
    out.push_str(&format!("Verifier: {}\n", report.result.name));
    out.push_str(&format!(
        "Result: {}\n",
        if report.result.is_success { "PASS" } else { "FAIL" }
    ));
    out.push_str(&format!("Message: {}\n", report.result.message));
    if let Some(error) = &report.error {
        out.push_str(&format!("Error: {error}\n"));
    }
    out
}
