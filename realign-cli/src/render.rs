use realign_core::{ComputedView, DaysNeeded, DiagnosticItem, ProjectedSpan};

/// `HH:MM - HH:MM`, with the end's day offset when the span crosses a
/// display-zone midnight.
fn span_label(span: &ProjectedSpan) -> String {
    match span.day_delta {
        0 => format!("{} - {}", span.start.hhmm(), span.end.hhmm()),
        d => format!("{} - {} ({d:+}d)", span.start.hhmm(), span.end.hhmm()),
    }
}

/// Plain-text table of the computed days in the view's display zone.
pub fn format_table(view: &ComputedView) -> String {
    let mut out = String::new();

    let days = match view.meta.days_needed {
        DaysNeeded::Finite(n) => n.to_string(),
        DaysNeeded::Unbounded => "never at these caps".to_string(),
    };
    out.push_str(&format!(
        "# Realignment plan ({})\n\nZone delta: {:+.2}h | shift {:?} {:+.2}h | days needed: {}\n\n",
        view.zone, view.meta.total_delta_hours, view.meta.direction, view.meta.shift_hours, days
    ));

    out.push_str(&format!(
        "{:<10}  {:<20}  {:<20}  {:>6}\n",
        "date", "sleep", "bright light", "shift"
    ));
    for (day, projected) in view.days.iter().zip(&view.projected_days) {
        let light = projected
            .bright
            .as_ref()
            .map_or_else(|| "--".to_string(), span_label);
        out.push_str(&format!(
            "{:<10}  {:<20}  {:<20}  {:>+6.2}\n",
            projected.date,
            span_label(&projected.sleep),
            light,
            day.shift_hours
        ));
    }

    if !view.diagnostics.is_empty() {
        out.push_str("\n## Skipped\n\n");
        for d in &view.diagnostics {
            let what = match &d.item {
                DiagnosticItem::Anchor { id } => format!("anchor {id}"),
                DiagnosticItem::Event { id } => format!("event {id}"),
                DiagnosticItem::Strategy => "strategy".to_string(),
            };
            out.push_str(&format!("- {what}: {}\n", d.reason));
        }
    }

    out
}
