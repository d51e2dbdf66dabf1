use crate::alerting::generate_alert;
use crate::models::RiskReport;
use crate::monitor::Assessment;
use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

/// Output handler for risk reports and assessments
pub struct OutputHandler {
    format: OutputFormat,
    writer: Option<Box<dyn Write + Send>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum OutputFormat {
    Json,
    Jsonl,
    Console,
}

impl OutputFormat {
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => OutputFormat::Json,
            "jsonl" => OutputFormat::Jsonl,
            "console" => OutputFormat::Console,
            _ => OutputFormat::Jsonl,
        }
    }
}

impl OutputHandler {
    pub fn new(format: OutputFormat, file_path: Option<PathBuf>) -> Result<Self, Box<dyn std::error::Error>> {
        let writer: Option<Box<dyn Write + Send>> = match (&format, file_path) {
            (OutputFormat::Console, _) => None,
            (_, Some(path)) => {
                let file = OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(path)?;
                Some(Box::new(BufWriter::new(file)))
            }
            (_, None) => None,
        };

        Ok(OutputHandler { format, writer })
    }

    /// Write a single risk report
    pub fn write_report(&mut self, report: &RiskReport) -> Result<(), Box<dyn std::error::Error>> {
        let output = match &self.format {
            OutputFormat::Json => format!("{}\n", serde_json::to_string_pretty(report)?),
            OutputFormat::Jsonl => format!("{}\n", serde_json::to_string(report)?),
            OutputFormat::Console => format!("{}\n\n", generate_alert(report)),
        };
        self.write_output(&output)
    }

    /// Write a whole assessment
    ///
    /// JSON formats emit the assessment object; JSON lines puts it on one line.
    /// Console prints a header followed by each alert.
    pub fn write_assessment(&mut self, assessment: &Assessment) -> Result<(), Box<dyn std::error::Error>> {
        match &self.format {
            OutputFormat::Json => {
                let json = serde_json::to_string_pretty(assessment)?;
                self.write_output(&format!("{}\n", json))?;
            }
            OutputFormat::Jsonl => {
                let json = serde_json::to_string(assessment)?;
                self.write_output(&format!("{}\n", json))?;
            }
            OutputFormat::Console => {
                let header = format!(
                    "{} event(s) in the last {} hour(s), showing {} [{:?}] at {}\n\n",
                    assessment.total_found,
                    assessment.hours_checked,
                    assessment.earthquakes.len(),
                    assessment.source,
                    assessment.timestamp.to_rfc3339()
                );
                self.write_output(&header)?;
                for report in &assessment.earthquakes {
                    self.write_report(report)?;
                }
            }
        }
        Ok(())
    }

    fn write_output(&mut self, data: &str) -> Result<(), Box<dyn std::error::Error>> {
        match &mut self.writer {
            Some(writer) => {
                writer.write_all(data.as_bytes())?;
                writer.flush()?;
            }
            None => {
                print!("{}", data);
                std::io::stdout().flush()?;
            }
        }
        Ok(())
    }

    /// Flush any buffered output
    pub fn flush(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(writer) = &mut self.writer {
            writer.flush()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Coordinates, EventTime, RiskLevel};

    fn report(place: &str, risk: RiskLevel) -> RiskReport {
        RiskReport {
            place: place.to_string(),
            magnitude: 6.8,
            depth_km: 45.0,
            coordinates: Coordinates { lat: -4.2, lon: 101.3 },
            risk,
            time: EventTime::from_millis(1700000000000),
        }
    }

    #[test]
    fn test_format_from_str() {
        assert_eq!(OutputFormat::from_str("JSON"), OutputFormat::Json);
        assert_eq!(OutputFormat::from_str("console"), OutputFormat::Console);
        assert_eq!(OutputFormat::from_str("yaml"), OutputFormat::Jsonl);
    }

    #[test]
    fn test_jsonl_appends_one_line_per_report() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reports.jsonl");

        let mut handler = OutputHandler::new(OutputFormat::Jsonl, Some(path.clone())).unwrap();
        handler.write_report(&report("Southern Sumatra", RiskLevel::Moderate)).unwrap();
        handler.write_report(&report("Nicobar Islands", RiskLevel::Low)).unwrap();
        handler.flush().unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);

        let first: RiskReport = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first.place, "Southern Sumatra");
        assert_eq!(first.risk, RiskLevel::Moderate);
        assert_eq!(first.time, EventTime::from_millis(1700000000000));
    }

    #[test]
    fn test_existing_file_is_appended() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reports.jsonl");
        std::fs::write(&path, "{}\n").unwrap();

        let mut handler = OutputHandler::new(OutputFormat::Jsonl, Some(path.clone())).unwrap();
        handler.write_report(&report("Banda Sea", RiskLevel::High)).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents.lines().count(), 2);
    }
}
