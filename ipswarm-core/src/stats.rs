use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

/// Outcome counts for a finished Scenario run.
#[derive(Clone, Debug, Default)]
pub struct RunStatistics {
    /// Users actually started. Lower than configured when the run ended before all spawned.
    pub users: usize,
    pub iterations: u64,
    /// Iterations completed per task name.
    pub task_iterations: BTreeMap<&'static str, u64>,
    pub success: u64,
    pub error: u64,
    pub elapsed: Duration,
}

impl RunStatistics {
    pub fn requests(&self) -> u64 {
        self.success + self.error
    }

    pub fn error_rate(&self) -> f64 {
        if self.requests() == 0 {
            0.
        } else {
            self.error as f64 / self.requests() as f64
        }
    }
}

impl fmt::Display for RunStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Users={}, Iterations={}, Requests={}, Errors={}, ErrorRate={:.2}, Elapsed={}",
            self.users,
            self.iterations,
            self.requests(),
            self.error,
            self.error_rate(),
            humantime::format_duration(self.elapsed),
        )?;
        for (task, count) in &self.task_iterations {
            write!(f, ", {task}={count}")?;
        }
        Ok(())
    }
}
