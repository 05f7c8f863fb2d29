use std::fmt::Write;

use incinerator_engine::RunSummary;

pub(crate) fn render_summary(summary: &RunSummary) -> String {
    let mut out = String::new();
    if summary.attempted == 0 {
        let _ = writeln!(
            out,
            "No items to incinerate ({} records checked).",
            summary.records
        );
    } else if summary.is_clean() {
        let _ = writeln!(
            out,
            "All {} incineration operations completed successfully.",
            summary.attempted
        );
    } else {
        let _ = writeln!(
            out,
            "{} of {} incineration operations failed:",
            summary.failed, summary.attempted
        );
        for failure in &summary.failures {
            let _ = writeln!(out, "  {failure}");
        }
    }
    let _ = writeln!(
        out,
        "attempted={} succeeded={} failed={} elapsed={:.2?}",
        summary.attempted, summary.succeeded, summary.failed, summary.elapsed
    );
    out
}
