use std::path::PathBuf;
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use parking_lot::Mutex;

/// Timestamped log sink shared between the window and the conversion
/// thread. Every line also goes to the `log` facade.
#[derive(Clone)]
pub struct Logger {
    sender: mpsc::Sender<String>,
}

impl Logger {
    pub fn new(log_messages: Arc<Mutex<Vec<String>>>) -> Self {
        let (sender, receiver) = mpsc::channel();

        thread::spawn(move || {
            for message in receiver {
                log_messages.lock().push(message);
            }
        });

        Logger { sender }
    }

    pub fn log(&self, message: String) {
        log::info!("{}", message);
        self.push(message);
    }

    pub fn warn(&self, message: String) {
        log::warn!("{}", message);
        self.push(message);
    }

    fn push(&self, message: String) {
        let timestamp = chrono::Local::now().format("%H:%M:%S%.3f");
        // The collector only stops once every handle is dropped.
        let _ = self.sender.send(format!("[{}] {}", timestamp, message));
    }
}

pub fn measure_time<F, T>(f: F) -> (T, Duration)
where
    F: FnOnce() -> T,
{
    let start = Instant::now();
    let result = f();
    let duration = start.elapsed();
    (result, duration)
}

pub fn get_memory_usage() -> String {
    if let Ok(mem_info) = sys_info::mem_info() {
        format!(
            "Memory: Total: {} MB, Free: {} MB, Used: {} MB",
            mem_info.total / 1024,
            mem_info.free / 1024,
            mem_info.total.saturating_sub(mem_info.free) / 1024
        )
    } else {
        "Unable to get memory info".to_string()
    }
}

/// Downloads folder of the current user, or the working directory when
/// the platform has no home directory.
pub fn default_output_directory() -> PathBuf {
    dirs::download_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join("Downloads")))
        .unwrap_or_else(|| PathBuf::from("."))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn logger_collects_timestamped_messages() {
        let messages = Arc::new(Mutex::new(Vec::new()));
        let logger = Logger::new(messages.clone());
        logger.log("first".to_string());
        logger.warn("second failed".to_string());

        let deadline = Instant::now() + Duration::from_secs(5);
        while messages.lock().len() < 2 && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(5));
        }

        let messages = messages.lock();
        assert_eq!(messages.len(), 2);
        assert!(messages[0].starts_with('['));
        assert!(messages[0].ends_with("] first"));
        assert!(messages[1].ends_with("] second failed"));
    }

    #[test]
    fn measure_time_returns_the_closure_result() {
        let (value, duration) = measure_time(|| 21 * 2);
        assert_eq!(value, 42);
        assert!(duration < Duration::from_secs(1));
    }

    #[test]
    fn default_output_directory_is_not_empty() {
        assert!(!default_output_directory().as_os_str().is_empty());
    }
}
