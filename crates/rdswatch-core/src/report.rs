//! HTML report body rendering.
//!
//! The body is regenerated from the current record on every run — a
//! reply never inherits content from the prior message, so each email
//! reflects only the latest fetch.

use crate::record::DbStatusRecord;

/// Render the full HTML report for one instance snapshot.
pub fn render_report(instance_id: &str, record: &DbStatusRecord) -> String {
    let generated_at = chrono::Utc::now().format("%Y-%m-%d %H:%M UTC");
    format!(
        r#"<html>
<body>
    <h3 style="color: #2E86C1;">RDS Maintenance Update</h3>
    <p><b>Target Database:</b> {instance}</p>
    <table border="1" cellpadding="5" cellspacing="0" style="border-collapse: collapse;">
        <tr style="background-color: #f2f2f2;"><th>Parameter</th><th>Value</th></tr>
        <tr><td>Engine</td><td>{engine}</td></tr>
        <tr><td>Current Version</td><td>{version}</td></tr>
        <tr><td>Status</td><td>{status}</td></tr>
        <tr><td>Endpoint</td><td>{endpoint}</td></tr>
        <tr><td>Maintenance Window</td><td>{window}</td></tr>
    </table>
    <p><b>Pending Modifications:</b> {pending}</p>
    <p style="color: #888;">Generated {generated_at}</p>
    <br>
    <p>Regards,<br>Cloud Automation Bot</p>
</body>
</html>
"#,
        instance = escape_html(instance_id),
        engine = escape_html(&record.engine),
        version = escape_html(&record.version),
        status = escape_html(&record.status),
        endpoint = escape_html(&record.endpoint),
        window = escape_html(&record.maintenance_window),
        pending = render_pending(record),
    )
}

/// Pending changes as "key = value" lines, or the literal "None".
fn render_pending(record: &DbStatusRecord) -> String {
    if record.pending_mods.is_empty() {
        return "None".to_string();
    }
    record
        .pending_mods
        .iter()
        .map(|(key, value)| format!("{} = {}", escape_html(key), escape_html(value)))
        .collect::<Vec<_>>()
        .join("<br>")
}

/// Minimal escaping for values interpolated into the body. Provider
/// error text ends up in `status`, so markup characters must not pass
/// through raw.
fn escape_html(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}
