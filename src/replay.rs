//! Recorded input replay
//!
//! A trace is a list of sensor events stamped with virtual time. Replaying it drives the full
//! pipeline (both recognizers feeding the navigation controller) on a [`ManualScheduler`], so
//! the same trace always yields the same report.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tokio::fs;
use tracing::{debug, info};

use crate::config::GestureConfig;
use crate::controller::{NavigationController, NavigationEvent, NavigationListener};
use crate::error::{ConfigError, TraceError};
use crate::gesture::{GestureLog, GestureRecord, InputSource, PointerSwipe, WheelSwipe};
use crate::sensors::{SensorEvent, Sensors};
use crate::subscription::Subscription;
use crate::swipe_state::SwipeState;
use crate::timers::{Clock, ManualScheduler, TimerRegistry};

/// One recorded sensor event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceStep {
    /// Virtual time of the event in ms
    pub at: u64,
    pub event: SensorEvent,
}

/// Recorded input session
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Trace {
    #[serde(default)]
    pub steps: Vec<TraceStep>,
}

impl Trace {
    /// Load a trace; `.json` files are parsed as JSON, anything else as YAML
    pub async fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read trace file: {}", path))?;

        let is_json = Path::new(path)
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        let trace: Trace = if is_json {
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse JSON trace: {}", path))?
        } else {
            serde_yaml::from_str(&contents)
                .with_context(|| format!("Failed to parse YAML trace: {}", path))?
        };

        trace.validate()?;
        Ok(trace)
    }

    /// Steps must be in non-decreasing time order
    pub fn validate(&self) -> Result<(), TraceError> {
        for (step, pair) in self.steps.windows(2).enumerate() {
            if pair[1].at < pair[0].at {
                return Err(TraceError::OutOfOrder {
                    step: step + 1,
                    at_ms: pair[1].at,
                    previous_ms: pair[0].at,
                });
            }
        }
        Ok(())
    }

    /// Time of the last step
    pub fn end_ms(&self) -> u64 {
        self.steps.last().map_or(0, |s| s.at)
    }
}

/// Outcome of a replay
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayReport {
    /// Every lifecycle call in the order the controller received it
    pub records: Vec<GestureRecord>,
    pub navigation: Vec<NavigationEvent>,
    pub final_index: usize,
    pub final_state: SwipeState,
    /// Virtual time when the replay stopped
    pub ended_at_ms: u64,
}

impl ReplayReport {
    /// Lifecycle calls produced by one recognizer
    pub fn records_from(&self, source: InputSource) -> impl Iterator<Item = &GestureRecord> {
        self.records.iter().filter(move |r| r.source == source)
    }

    /// Number of gestures started
    pub fn gestures_started(&self) -> usize {
        self.records.iter().filter(|r| r.event.is_start()).count()
    }
}

/// Both recognizers wired to a navigation controller through one sensor registry
pub struct Pipeline {
    sensors: Sensors,
    controller: Arc<NavigationController>,
    log: GestureLog,
    pointer: Arc<PointerSwipe>,
    wheel: Arc<WheelSwipe>,
    _subscriptions: Vec<Subscription>,
}

impl Pipeline {
    pub fn new(
        config: &GestureConfig,
        clock: Arc<dyn Clock>,
        timers: Arc<dyn TimerRegistry>,
        listener: Option<NavigationListener>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let sensors = Sensors::new();
        let controller =
            NavigationController::new(config.navigation_options(), timers.clone(), listener);

        let log = GestureLog::new(InputSource::Pointer, clock.clone())
            .forwarding_to(controller.clone(), Some(controller.clone()));
        let wheel_log = log.sharing(InputSource::Wheel);

        let pointer = Arc::new(PointerSwipe::new(
            config.pointer_options(),
            clock.clone(),
            controller.validator(),
            Arc::new(log.clone()),
            Arc::new(log.clone()),
        ));
        let wheel = WheelSwipe::new(
            config.wheel_options(),
            clock,
            timers,
            controller.swipe_state(),
            controller.validator(),
            Arc::new(wheel_log),
        );

        let mut subscriptions = pointer.attach(&sensors);
        subscriptions.extend(wheel.attach(&sensors));
        debug!(subscriptions = subscriptions.len(), "Gesture pipeline attached");

        Ok(Self {
            sensors,
            controller,
            log,
            pointer,
            wheel,
            _subscriptions: subscriptions,
        })
    }

    pub fn dispatch(&self, event: &SensorEvent) {
        self.sensors.dispatch(event);
    }

    pub fn controller(&self) -> &Arc<NavigationController> {
        &self.controller
    }

    pub fn pointer(&self) -> &Arc<PointerSwipe> {
        &self.pointer
    }

    pub fn wheel(&self) -> &Arc<WheelSwipe> {
        &self.wheel
    }

    pub fn report(&self, ended_at_ms: u64) -> ReplayReport {
        ReplayReport {
            records: self.log.records(),
            navigation: self.controller.events(),
            final_index: self.controller.index(),
            final_state: self.controller.state(),
            ended_at_ms,
        }
    }
}

/// Replay `trace` on virtual time, then let pending timers run for `settle_ms`
pub fn replay(
    config: &GestureConfig,
    trace: &Trace,
    settle_ms: u64,
) -> Result<ReplayReport, TraceError> {
    trace.validate()?;

    let scheduler = Arc::new(ManualScheduler::new());
    let pipeline = Pipeline::new(config, scheduler.clone(), scheduler.clone(), None)?;

    for step in &trace.steps {
        scheduler.advance_to(step.at);
        pipeline.dispatch(&step.event);
    }
    scheduler.advance_to(trace.end_ms().saturating_add(settle_ms));

    let report = pipeline.report(scheduler.now_ms());
    info!(
        steps = trace.steps.len(),
        gestures = report.gestures_started(),
        navigations = report.navigation.len(),
        final_index = report.final_index,
        "Trace replayed"
    );
    Ok(report)
}
