//! Energy integration while a workload runs.
//!
//! The sampler and the workload are two independent activities: the workload
//! is an OS process or a tokio task, the sampler is the caller's future. The
//! sampler only observes whether the workload has finished; it never signals
//! or waits on it beyond that poll.

use std::ffi::OsStr;
use std::future::Future;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use jetpower_platform::PowerSource;
use tokio::process::{Child, Command};
use tokio::task::JoinHandle;
use tokio::time::{sleep, Instant};
use tracing::{debug, info, trace, warn};

use crate::baseline::Baseline;
use crate::config::SamplingRate;
use crate::error::{MeterError, Result};

/// Running energy integrals for one monitored workload.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EnergyTotals {
    /// Integrated power in milliwatt-seconds (millijoules).
    pub raw_mws: f64,
    /// Integrated `power - baseline`. May go negative when the board draws
    /// less than its idle estimate.
    pub over_idle_mws: f64,
    /// Sum of every integration window.
    pub integrated: Duration,
    pub samples: usize,
}

impl EnergyTotals {
    /// Adds one sample held over `window`.
    pub fn integrate(&mut self, power_mw: f64, baseline: Baseline, window: Duration) {
        let width_secs = window.as_secs_f64();
        self.raw_mws += power_mw * width_secs;
        self.over_idle_mws += (power_mw - baseline.mw()) * width_secs;
        self.integrated += window;
        self.samples += 1;
    }

    pub fn raw_joules(&self) -> f64 {
        self.raw_mws / 1000.0
    }

    pub fn over_idle_joules(&self) -> f64 {
        self.over_idle_mws / 1000.0
    }
}

/// Outcome of one monitored run.
#[derive(Debug, Clone, PartialEq)]
pub struct Measurement {
    pub energy: EnergyTotals,
    /// Wall-clock time from launch until the sampler saw the workload finish.
    pub total_time: Duration,
    /// Highest sample seen. Only tracked for external commands.
    pub max_power_mw: Option<f64>,
    /// Exit code of an external command, if it exited normally.
    pub exit_code: Option<i32>,
}

impl Measurement {
    /// `(raw mW·s, over-idle mW·s, total seconds)`.
    pub fn as_tuple(&self) -> (f64, f64, f64) {
        (
            self.energy.raw_mws,
            self.energy.over_idle_mws,
            self.total_time.as_secs_f64(),
        )
    }
}

enum Workload {
    Process {
        child: Child,
        status: Option<ExitStatus>,
    },
    Task(JoinHandle<()>),
}

impl Workload {
    fn has_finished(&mut self) -> Result<bool> {
        match self {
            Workload::Process { child, status } => {
                if status.is_none() {
                    *status = child.try_wait().map_err(MeterError::Wait)?;
                }
                Ok(status.is_some())
            }
            Workload::Task(handle) => Ok(handle.is_finished()),
        }
    }

    fn exit_code(&self) -> Option<i32> {
        match self {
            Workload::Process { status, .. } => status.and_then(|s| s.code()),
            Workload::Task(_) => None,
        }
    }

    fn tracks_peak(&self) -> bool {
        matches!(self, Workload::Process { .. })
    }
}

/// Samples a power source while exactly one workload runs.
///
/// Every `measure_*` method consumes the monitor, so a monitor runs at most
/// one sampling loop and its totals cannot be reused for a second workload.
///
/// Monitors come from [`PowerMeter::monitor`](crate::PowerMeter::monitor), so
/// the idle baseline is always finished before sampling starts.
///
/// ```compile_fail
/// # async fn measure(meter: jetpower_meter::PowerMeter) {
/// let monitor = jetpower_meter::WorkloadMonitor::new(
///     meter.source(),
///     meter.baseline(),
///     meter.sampling_rate(),
/// );
/// # }
/// ```
pub struct WorkloadMonitor<S> {
    source: S,
    baseline: Baseline,
    rate: SamplingRate,
}

impl<S: PowerSource> WorkloadMonitor<S> {
    pub(crate) fn new(source: S, baseline: Baseline, rate: SamplingRate) -> Self {
        Self {
            source,
            baseline,
            rate,
        }
    }

    /// Launches `argv[0]` with the remaining arguments and samples until it
    /// exits. Stdin is closed; stdout and stderr pass through untouched.
    pub async fn measure_command<I, A>(self, argv: I) -> Result<Measurement>
    where
        I: IntoIterator<Item = A>,
        A: AsRef<OsStr>,
    {
        let mut argv = argv.into_iter();
        let program = argv.next().ok_or(MeterError::EmptyCommand)?;
        let args: Vec<A> = argv.collect();
        let command = program.as_ref().to_string_lossy().into_owned();

        let start = Instant::now();
        let child = Command::new(program.as_ref())
            .args(&args)
            .stdin(Stdio::null())
            .spawn()
            .map_err(|source| MeterError::Launch {
                command: command.clone(),
                source,
            })?;
        debug!(command = %command, pid = ?child.id(), "Workload launched");

        self.run(
            start,
            Workload::Process {
                child,
                status: None,
            },
        )
        .await
    }

    /// Runs `task` on the tokio runtime and samples until it completes.
    /// The task's output, including a panic, is discarded.
    pub async fn measure_task<F>(self, task: F) -> Result<Measurement>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        let start = Instant::now();
        let handle = tokio::spawn(async move {
            let _ = task.await;
        });
        self.run(start, Workload::Task(handle)).await
    }

    /// Runs blocking `work` on tokio's blocking pool and samples until it
    /// returns.
    pub async fn measure_blocking<F, R>(self, work: F) -> Result<Measurement>
    where
        F: FnOnce() -> R + Send + 'static,
        R: Send + 'static,
    {
        let start = Instant::now();
        let handle = tokio::task::spawn_blocking(move || {
            let _ = work();
        });
        self.run(start, Workload::Task(handle)).await
    }

    async fn run(self, start: Instant, mut workload: Workload) -> Result<Measurement> {
        info!(
            interval_ms = self.rate.interval().as_secs_f64() * 1000.0,
            baseline_mw = self.baseline.mw(),
            channels = self.source.channel_count(),
            "Monitoring workload"
        );

        let (energy, max_power_mw) = self.sample_until_finished(&mut workload).await?;
        let total_time = start.elapsed();

        if let Some(max_mw) = max_power_mw {
            info!(max_power_mw = max_mw, "Max power was {:.3} W", max_mw / 1000.0);
        }
        info!(
            raw_mws = energy.raw_mws,
            over_idle_mws = energy.over_idle_mws,
            samples = energy.samples,
            total_secs = total_time.as_secs_f64(),
            "Workload finished"
        );

        Ok(Measurement {
            energy,
            total_time,
            max_power_mw,
            exit_code: workload.exit_code(),
        })
    }

    /// The loop exits on the first poll that finds the workload done, so the
    /// interval in which it finished is never sampled.
    async fn sample_until_finished(
        &self,
        workload: &mut Workload,
    ) -> Result<(EnergyTotals, Option<f64>)> {
        let interval = self.rate.interval();
        let track_peak = workload.tracks_peak();
        let mut totals = EnergyTotals::default();
        let mut max_power_mw: Option<f64> = None;

        loop {
            sleep(interval).await;

            let poll_start = Instant::now();
            if workload.has_finished()? {
                break;
            }

            let power_mw = match self.source.instant_power_mw() {
                Ok(power_mw) => power_mw,
                Err(source) => {
                    warn!(
                        error = %source,
                        samples = totals.samples,
                        "Power sample failed, aborting measurement"
                    );
                    return Err(MeterError::Sample {
                        partial: totals,
                        source,
                    });
                }
            };
            let read_overhead = poll_start.elapsed();

            totals.integrate(power_mw, self.baseline, interval + read_overhead);
            if track_peak {
                max_power_mw = Some(max_power_mw.map_or(power_mw, |max| max.max(power_mw)));
            }

            trace!(
                power_mw,
                overhead_us = read_overhead.as_micros() as u64,
                "Sample"
            );
        }

        Ok((totals, max_power_mw))
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use jetpower_platform::{ChannelSet, SensorDiscovery, SysfsPower, Topology, ORIN_HWMON_PATH};
    use tempfile::TempDir;

    use super::*;
    use crate::testing::ScriptedSource;

    const EPSILON: f64 = 1e-9;

    fn monitor<S: PowerSource>(source: S, baseline_mw: f64, hz: f64) -> WorkloadMonitor<S> {
        WorkloadMonitor::new(
            source,
            Baseline::from_mw(baseline_mw),
            SamplingRate::from_hz(hz).unwrap(),
        )
    }

    fn sleeper(secs: f64) -> impl Future<Output = ()> + Send + 'static {
        tokio::time::sleep(Duration::from_secs_f64(secs))
    }

    fn assert_close(actual: f64, expected: f64, tolerance: f64) {
        assert!(
            (actual - expected).abs() <= tolerance,
            "expected {} within {} of {}",
            actual,
            tolerance,
            expected
        );
    }

    #[test]
    fn test_integrate_accumulates_both_totals() {
        let mut totals = EnergyTotals::default();
        totals.integrate(100.0, Baseline::from_mw(40.0), Duration::from_millis(500));
        totals.integrate(20.0, Baseline::from_mw(40.0), Duration::from_millis(500));

        assert_close(totals.raw_mws, 60.0, EPSILON);
        assert_close(totals.over_idle_mws, 20.0, EPSILON);
        assert_eq!(totals.integrated, Duration::from_secs(1));
        assert_eq!(totals.samples, 2);
        assert_close(totals.raw_joules(), 0.06, EPSILON);
    }

    #[tokio::test(start_paused = true)]
    async fn test_one_second_task_at_ten_hz() {
        let source = ScriptedSource::constant(100.0);

        let measurement = monitor(&source, 0.0, 10.0)
            .measure_task(sleeper(1.0))
            .await
            .unwrap();

        let (raw, over_idle, total_secs) = measurement.as_tuple();
        assert_close(raw, 100.0, 10.0 + EPSILON);
        assert_close(over_idle, raw, EPSILON);
        assert_close(total_secs, 1.0, 0.1 + EPSILON);
        assert_eq!(measurement.max_power_mw, None);
        assert_eq!(measurement.exit_code, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_samples_once_per_interval_until_finished() {
        let source = ScriptedSource::constant(100.0);

        let measurement = monitor(&source, 0.0, 10.0)
            .measure_task(sleeper(1.05))
            .await
            .unwrap();

        assert_eq!(measurement.energy.samples, 10);
        assert_eq!(source.reads(), 10);
        assert_eq!(measurement.energy.integrated, Duration::from_secs(1));
        assert_close(measurement.energy.raw_mws, 100.0, EPSILON);
        assert_close(measurement.total_time.as_secs_f64(), 1.1, 1e-3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_finished_workload_is_not_sampled() {
        let source = ScriptedSource::constant(100.0);

        let measurement = monitor(&source, 0.0, 10.0)
            .measure_task(sleeper(0.05))
            .await
            .unwrap();

        assert_eq!(measurement.energy, EnergyTotals::default());
        assert_eq!(source.reads(), 0);
        assert_close(measurement.total_time.as_secs_f64(), 0.1, 1e-3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_energy_scales_linearly_with_duration() {
        let short_source = ScriptedSource::constant(100.0);
        let long_source = ScriptedSource::constant(100.0);

        let short = monitor(&short_source, 40.0, 10.0)
            .measure_task(sleeper(1.05))
            .await
            .unwrap();
        let long = monitor(&long_source, 40.0, 10.0)
            .measure_task(sleeper(2.05))
            .await
            .unwrap();

        assert_close(long.energy.raw_mws, 2.0 * short.energy.raw_mws, EPSILON);
        assert_close(
            long.energy.over_idle_mws,
            2.0 * short.energy.over_idle_mws,
            EPSILON,
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_over_idle_is_raw_minus_baseline_energy() {
        let source = ScriptedSource::constant(250.0);

        let measurement = monitor(&source, 75.0, 20.0)
            .measure_task(sleeper(1.52))
            .await
            .unwrap();

        let energy = measurement.energy;
        assert!(energy.samples > 0);
        assert_close(
            energy.over_idle_mws,
            energy.raw_mws - 75.0 * energy.integrated.as_secs_f64(),
            1e-6,
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_below_baseline_accumulates_negative_over_idle() {
        let source = ScriptedSource::constant(10.0);

        let measurement = monitor(&source, 50.0, 10.0)
            .measure_task(sleeper(0.55))
            .await
            .unwrap();

        assert!(measurement.energy.raw_mws > 0.0);
        assert!(measurement.energy.over_idle_mws < 0.0);
        assert_close(measurement.energy.over_idle_mws, -20.0, EPSILON);
    }

    #[tokio::test(start_paused = true)]
    async fn test_repeated_runs_agree() {
        let first = monitor(ScriptedSource::constant(42.0), 7.0, 20.0)
            .measure_task(sleeper(0.75))
            .await
            .unwrap();
        let second = monitor(ScriptedSource::constant(42.0), 7.0, 20.0)
            .measure_task(sleeper(0.75))
            .await
            .unwrap();

        assert_eq!(first.energy, second.energy);
        assert_eq!(first.total_time, second.total_time);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_channels_accumulate_nothing() {
        let power = SysfsPower::new(ChannelSet::empty(Topology::Orin));

        let measurement = monitor(&power, 0.0, 10.0)
            .measure_task(sleeper(0.5))
            .await
            .unwrap();

        assert!(measurement.energy.samples > 0);
        assert_eq!(measurement.energy.raw_mws, 0.0);
        assert_eq!(measurement.energy.over_idle_mws, 0.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_read_error_aborts_with_last_valid_totals() {
        let source = ScriptedSource::failing_after(100.0, 3);

        let err = monitor(&source, 0.0, 10.0)
            .measure_task(sleeper(10.0))
            .await
            .unwrap_err();

        match err {
            MeterError::Sample { partial, .. } => {
                assert_eq!(partial.samples, 3);
                assert_close(partial.raw_mws, 30.0, EPSILON);
            }
            other => panic!("expected sample error, got {other:?}"),
        }
        assert_eq!(source.reads(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_channel_file_deleted_mid_run() {
        let root = TempDir::new().unwrap();
        let hwmon = root.path().join(ORIN_HWMON_PATH);
        fs::create_dir_all(&hwmon).unwrap();
        fs::write(hwmon.join("curr0_input"), "2.0\n").unwrap();
        fs::write(hwmon.join("in0_input"), "1000.0\n").unwrap();
        let power = SysfsPower::discover(&SensorDiscovery::new(root.path(), Topology::Orin));

        let doomed = hwmon.join("in0_input");
        let workload = async move {
            tokio::time::sleep(Duration::from_millis(250)).await;
            fs::remove_file(&doomed).unwrap();
            tokio::time::sleep(Duration::from_secs(10)).await;
        };

        let err = monitor(&power, 0.0, 10.0)
            .measure_task(workload)
            .await
            .unwrap_err();

        match err {
            MeterError::Sample { partial, source } => {
                assert_eq!(partial.samples, 2);
                assert_close(partial.raw_mws, 2.0 * 0.2, EPSILON);
                assert_eq!(source.path(), &hwmon.join("in0_input"));
            }
            other => panic!("expected sample error, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_panicking_task_still_finishes() {
        let source = ScriptedSource::constant(1.0);

        let measurement = monitor(&source, 0.0, 10.0)
            .measure_task(async {
                tokio::time::sleep(Duration::from_millis(250)).await;
                panic!("simulated workload failure");
            })
            .await
            .unwrap();

        assert_eq!(measurement.energy.samples, 2);
    }

    #[tokio::test]
    async fn test_command_reports_peak_and_exit_code() {
        let source = ScriptedSource::sequence_then([50.0, 300.0], 100.0);

        let measurement = monitor(&source, 0.0, 50.0)
            .measure_command(["sh", "-c", "sleep 0.3"])
            .await
            .unwrap();

        assert!(measurement.energy.samples >= 2);
        assert_eq!(measurement.max_power_mw, Some(300.0));
        assert_eq!(measurement.exit_code, Some(0));
        assert!(measurement.total_time >= Duration::from_millis(300));
    }

    #[tokio::test]
    async fn test_command_exit_code_is_reported() {
        let measurement = monitor(ScriptedSource::constant(5.0), 0.0, 50.0)
            .measure_command(["sh", "-c", "sleep 0.1; exit 3"])
            .await
            .unwrap();

        assert_eq!(measurement.exit_code, Some(3));
    }

    #[tokio::test]
    async fn test_missing_command_is_launch_error() {
        let err = monitor(ScriptedSource::constant(5.0), 0.0, 50.0)
            .measure_command(["/nonexistent/jetpower-workload"])
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            MeterError::Launch { ref command, .. } if command == "/nonexistent/jetpower-workload"
        ));
    }

    #[tokio::test]
    async fn test_empty_command_is_rejected() {
        let err = monitor(ScriptedSource::constant(5.0), 0.0, 50.0)
            .measure_command(Vec::<String>::new())
            .await
            .unwrap_err();

        assert!(matches!(err, MeterError::EmptyCommand));
    }

    #[tokio::test]
    async fn test_blocking_work_is_measured() {
        let source = ScriptedSource::constant(100.0);

        let measurement = monitor(&source, 0.0, 50.0)
            .measure_blocking(|| std::thread::sleep(Duration::from_millis(200)))
            .await
            .unwrap();

        assert!(measurement.energy.samples >= 1);
        assert!(measurement.total_time >= Duration::from_millis(200));
        assert_eq!(measurement.max_power_mw, None);
        assert_close(
            measurement.energy.raw_mws,
            100.0 * measurement.energy.integrated.as_secs_f64(),
            1e-6,
        );
    }
}
