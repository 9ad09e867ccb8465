//! Sensor diagnosis read-out

use crate::source::SharedSource;
use ecg_core::EcgResult;
use ecg_processing::SensorDiagnosis;
use tokio::time::{sleep, Duration};
use tracing::{debug, warn};

/// Take `readings` samples spaced `spacing` apart and classify them.
///
/// The source lock is held only for each individual read, so a running
/// scheduler keeps sampling in between.
pub async fn diagnose(
    source: &SharedSource,
    readings: usize,
    spacing: Duration,
) -> EcgResult<SensorDiagnosis> {
    let mut values = Vec::with_capacity(readings);

    for i in 0..readings {
        let value = source.lock().await.read();
        debug!(reading = i + 1, value, "Diagnostic reading");
        values.push(value);

        if i + 1 < readings {
            sleep(spacing).await;
        }
    }

    let diagnosis = SensorDiagnosis::from_readings(values)?;
    if diagnosis.is_flat() {
        warn!(range = diagnosis.range(), "Sensor signal is flat");
    }
    Ok(diagnosis)
}
