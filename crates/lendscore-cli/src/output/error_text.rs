use lendscore_engine::EngineError;

pub fn render_error(error: &EngineError) -> String {
    let mut lines = vec![
        format!("Error: {}", error.code),
        format!("  {}", error.message),
    ];

    if let Some(row) = error.data.as_ref().and_then(|data| data.get("row")) {
        lines.push(format!("  Row: {row}"));
    }

    lines.push(String::new());
    lines.push("What to do next:".to_string());
    if error.recovery_steps.is_empty() {
        lines.push("  1. Retry the command.".to_string());
    } else {
        for (index, step) in error.recovery_steps.iter().enumerate() {
            lines.push(format!("  {}. {step}", index + 1));
        }
    }

    lines.join("\n")
}
