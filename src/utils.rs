use std::{fs, io};
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::time::{Duration, Instant};

pub(crate) fn file_to_vec<P: AsRef<Path>>(filename: P) -> io::Result<Vec<String>> {
    let file_in = fs::File::open(filename)?;
    let file_reader = BufReader::new(file_in);
    file_reader.lines().collect()
}

/// Logs the time spent in `l_step` and returns the new checkpoint.
pub(crate) fn trace(l_type: &str, l_step: &str, detect: Instant, _detect_elapsed: Duration) -> Duration {
    log::trace!("{} | Total={:.2?} | {}={:.2?}", l_type, detect.elapsed(), l_step, detect.elapsed() - _detect_elapsed);
    detect.elapsed()
}

pub(crate) fn human_bytes(size: f64) -> String {
    let units = ["", "K", "M", "G", "T"];
    let mut size = size;
    let mut unit_index = 0;
    while size >= 1000.0 && unit_index < units.len() - 1 {
        size /= 1000.0;
        unit_index += 1;
    }
    format!("{:.1}{}", size, units[unit_index])
}
