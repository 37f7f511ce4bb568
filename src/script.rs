use regex::RegexBuilder;

use crate::command::non_query::NonQueryCommand;
use crate::command::ConfigureCommand;
use crate::error::DataAccessError;
use crate::registry::Registry;

/// The conventional batch delimiter: a line starting with `GO`.
pub const GO_DELIMITER: &str = "^GO";

/// Splits a SQL script into batches and runs each one as a non-query against
/// the named connection. The delimiter is a regex matched case-insensitively
/// in multi-line mode ([`GO_DELIMITER`] splits on lines starting with `GO`);
/// `None` runs the whole script as a single batch. Blank batches are skipped,
/// and the zero-rows-updated policy is disabled since DDL batches
/// legitimately affect no rows.
pub async fn execute_script(
    registry: &Registry,
    connection_name: &str,
    script: &str,
    batch_delimiter: Option<&str>,
) -> Result<(), DataAccessError> {
    let batches: Vec<&str> = match batch_delimiter {
        Some(pattern) => {
            let splitter = RegexBuilder::new(pattern)
                .case_insensitive(true)
                .multi_line(true)
                .build()
                .map_err(|e| {
                    DataAccessError::ConfigError(format!(
                        "invalid batch delimiter {pattern:?}: {e}"
                    ))
                })?;
            splitter.split(script).collect()
        }
        None => vec![script],
    };

    for batch in batches {
        let batch = batch.trim();
        if batch.is_empty() {
            continue;
        }
        NonQueryCommand::new()
            .connection(connection_name)
            .text(batch)
            .throw_when_no_record_updated(false)
            .execute(registry, None)
            .await?;
    }
    Ok(())
}
