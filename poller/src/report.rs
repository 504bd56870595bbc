use crate::sampler::Sample;

/// Human-readable operator line for one emitted row.
pub fn format_line(sample: &Sample) -> String {
    let temp = sample
        .cpu_temp
        .map_or_else(|| "N/A".to_string(), |t| format!("{t:.1}°C"));
    let pwr = sample
        .pwr_used
        .map_or_else(|| "N/A".to_string(), |p| format!("{p:.1}W"));

    format!(
        "TIMESTAMP: {} | CPU: {:.1}% | RAM: {:.1}% | DISK: {:.1}% | TEMP: {} | PWR: {} | UP: {:.1} B/s | DN: {:.1} B/s",
        sample.slot_ts,
        sample.cpu_used,
        sample.ram_used,
        sample.disk_used,
        temp,
        pwr,
        sample.net_up,
        sample.net_dn,
    )
}
