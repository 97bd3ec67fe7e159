use anyhow::Result;
use std::io::Write;

use deterrence_core::AnalysisReport;

pub fn write_json_report<W: Write>(out: &mut W, report: &AnalysisReport) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, report)?;
    writeln!(out)?;
    Ok(())
}
