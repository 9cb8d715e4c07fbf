//! The camera session state machine.

use std::cell::RefCell;

use image::RgbImage;
use tokio::sync::broadcast;

use super::{ActiveStream, CameraError, Facing, PageEvent, SessionState, SessionStats, StartOutcome};
use crate::config::CameraConfig;
use crate::platform::{DeviceSelector, MediaPlatform, MediaStream, StreamConstraints};

const EVENT_CAPACITY: usize = 32;

struct Inner<S> {
    state: SessionState,
    stream: Option<S>,
    active: Option<ActiveStream>,
    facing: Facing,
    selected_device: Option<String>,
    /// Bumped by every start, stop and hide. A pending start or switch
    /// whose epoch no longer matches has been superseded.
    epoch: u64,
    /// Set when the page hid a live session on a selected device; cleared
    /// by any explicit stop or start.
    resume_pending: bool,
    stats: SessionStats,
}

/// Owns the single live camera stream of a page.
///
/// All methods take `&self` so a stop can be issued while a start is
/// suspended on the platform. The session is meant for a single-threaded
/// cooperative executor and is deliberately `!Sync`.
pub struct CameraSession<P: MediaPlatform> {
    platform: P,
    config: CameraConfig,
    inner: RefCell<Inner<P::Stream>>,
    events: broadcast::Sender<SessionState>,
}

impl<P: MediaPlatform> CameraSession<P> {
    /// Creates an idle session on `platform`.
    pub fn new(platform: P, config: CameraConfig) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let facing = config.default_facing;
        Self {
            platform,
            config,
            inner: RefCell::new(Inner {
                state: SessionState::Idle,
                stream: None,
                active: None,
                facing,
                selected_device: None,
                epoch: 0,
                resume_pending: false,
                stats: SessionStats::default(),
            }),
            events,
        }
    }

    /// Returns the underlying platform.
    pub fn platform(&self) -> &P {
        &self.platform
    }

    /// Returns the session configuration.
    pub fn config(&self) -> &CameraConfig {
        &self.config
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        self.inner.borrow().state
    }

    /// Returns true while a stream is feeding the preview.
    pub fn is_active(&self) -> bool {
        self.state() == SessionState::Active
    }

    /// The stream shown in the preview, if any.
    pub fn active(&self) -> Option<ActiveStream> {
        self.inner.borrow().active.clone()
    }

    /// Facing used when no device is selected.
    pub fn facing(&self) -> Facing {
        self.inner.borrow().facing
    }

    /// Device the user picked explicitly, if any.
    pub fn selected_device(&self) -> Option<String> {
        self.inner.borrow().selected_device.clone()
    }

    /// Lifetime counters.
    pub fn stats(&self) -> SessionStats {
        self.inner.borrow().stats
    }

    /// Receives every state transition from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionState> {
        self.events.subscribe()
    }

    /// Starts streaming.
    ///
    /// Any active or pending stream is stopped first. The device is chosen
    /// from `device_id`, then the previously selected device, then
    /// `facing`, then the session's facing preference. A `device_id`
    /// becomes the selected device.
    pub async fn start(
        &self,
        device_id: Option<&str>,
        facing: Option<Facing>,
    ) -> Result<StartOutcome, CameraError> {
        self.halt();

        let (constraints, epoch) = {
            let mut inner = self.inner.borrow_mut();
            inner.resume_pending = false;
            if let Some(id) = device_id {
                inner.selected_device = Some(id.to_string());
            }
            if let Some(facing) = facing {
                inner.facing = facing;
            }
            let selector = match &inner.selected_device {
                Some(id) => DeviceSelector::Exact(id.clone()),
                None => DeviceSelector::Facing(inner.facing),
            };
            inner.epoch += 1;
            inner.stats.starts += 1;
            self.transition(&mut inner, SessionState::Starting);
            (
                StreamConstraints {
                    selector,
                    ideal_width: self.config.ideal_width,
                    ideal_height: self.config.ideal_height,
                },
                inner.epoch,
            )
        };

        tracing::debug!(?constraints, epoch, "Requesting camera stream");

        let opened = if self.platform.is_supported() {
            self.platform.open(&constraints).await
        } else {
            Err(crate::platform::MediaError::Unsupported)
        };

        let mut inner = self.inner.borrow_mut();

        if inner.epoch != epoch || inner.state != SessionState::Starting {
            if let Ok(mut stream) = opened {
                stream.stop();
                inner.stats.late_releases += 1;
                tracing::info!(epoch, "Released stream that arrived after its start was superseded");
            }
            return Ok(StartOutcome::Superseded);
        }

        match opened {
            Ok(stream) => {
                let settings = stream.settings();
                let resolved = settings.facing.unwrap_or(inner.facing);
                let active = ActiveStream {
                    device_id: settings.device_id,
                    facing: resolved,
                    mirrored: resolved.is_mirrored(),
                    width: settings.width,
                    height: settings.height,
                };
                inner.facing = resolved;
                inner.stream = Some(stream);
                inner.active = Some(active.clone());
                inner.stats.activations += 1;
                self.transition(&mut inner, SessionState::Active);

                tracing::info!(
                    device = %active.device_id,
                    facing = %active.facing,
                    mirrored = active.mirrored,
                    width = active.width,
                    height = active.height,
                    "Camera session active"
                );
                Ok(StartOutcome::Started(active))
            }
            Err(e) => {
                let err = CameraError::from(e);
                inner.stats.failures += 1;
                self.transition(&mut inner, SessionState::Failed);
                self.transition(&mut inner, SessionState::Idle);
                tracing::warn!(error = %err, "Camera session failed to start");
                Err(err)
            }
        }
    }

    /// Stops the session and releases every track.
    ///
    /// Idempotent. An explicit stop also cancels any pending auto-resume.
    pub fn stop(&self) {
        {
            let mut inner = self.inner.borrow_mut();
            inner.resume_pending = false;
            // also cancels a restart waiting out the switch delay
            inner.epoch += 1;
        }
        self.halt();
    }

    /// Stops, flips the facing preference and restarts after the
    /// configured delay.
    ///
    /// The explicit device selection is cleared so the new facing decides
    /// which camera opens.
    pub async fn switch_facing(&self) -> Result<StartOutcome, CameraError> {
        self.halt();
        let (facing, epoch) = {
            let mut inner = self.inner.borrow_mut();
            inner.facing = inner.facing.flipped();
            inner.selected_device = None;
            (inner.facing, inner.epoch)
        };
        tracing::info!(facing = %facing, "Switching camera facing");

        tokio::time::sleep(self.config.switch_delay()).await;
        if self.inner.borrow().epoch != epoch {
            tracing::debug!(epoch, "Switch cancelled during delay");
            return Ok(StartOutcome::Superseded);
        }
        self.start(None, None).await
    }

    /// Feeds a page lifecycle signal into the session.
    ///
    /// Returns the outcome of an automatic restart when one happened.
    pub async fn handle_page_event(
        &self,
        event: PageEvent,
    ) -> Result<Option<StartOutcome>, CameraError> {
        match event {
            PageEvent::Hidden => {
                let live = {
                    let mut inner = self.inner.borrow_mut();
                    inner.epoch += 1;
                    matches!(inner.state, SessionState::Active | SessionState::Starting)
                };
                if live {
                    self.halt();
                    let mut inner = self.inner.borrow_mut();
                    inner.resume_pending = inner.selected_device.is_some();
                    tracing::debug!(
                        resume = inner.resume_pending,
                        "Camera paused while page hidden"
                    );
                }
                Ok(None)
            }
            PageEvent::Visible => {
                let resume = {
                    let mut inner = self.inner.borrow_mut();
                    let resume = inner.resume_pending
                        && self.config.resume_on_visible
                        && inner.selected_device.is_some()
                        && inner.state == SessionState::Idle;
                    inner.resume_pending = false;
                    resume
                };
                if resume {
                    tracing::debug!("Resuming camera after page became visible");
                    self.start(None, None).await.map(Some)
                } else {
                    Ok(None)
                }
            }
            PageEvent::Unload => {
                self.stop();
                Ok(None)
            }
        }
    }

    /// Reads the frame currently in the preview along with its facing.
    pub fn read_frame(&self) -> Result<(RgbImage, Facing), CameraError> {
        let mut inner = self.inner.borrow_mut();
        if inner.state != SessionState::Active {
            return Err(CameraError::NoActiveSession);
        }
        let facing = inner
            .active
            .as_ref()
            .map(|a| a.facing)
            .ok_or(CameraError::NoActiveSession)?;
        let stream = inner.stream.as_mut().ok_or(CameraError::NoActiveSession)?;
        let frame = stream.read_frame()?;
        Ok((frame, facing))
    }

    /// Releases the stream without touching the resume flag.
    fn halt(&self) {
        let mut inner = self.inner.borrow_mut();
        match inner.state {
            SessionState::Active | SessionState::Starting => {
                self.transition(&mut inner, SessionState::Stopping);
                // invalidates any start still waiting on the platform
                inner.epoch += 1;
                if let Some(mut stream) = inner.stream.take() {
                    stream.stop();
                    inner.stats.stops += 1;
                }
                inner.active = None;
                self.transition(&mut inner, SessionState::Idle);
                tracing::info!("Camera stopped");
            }
            SessionState::Idle | SessionState::Stopping | SessionState::Failed => {}
        }
    }

    fn transition(&self, inner: &mut Inner<P::Stream>, next: SessionState) {
        tracing::trace!(from = ?inner.state, to = ?next, "Session transition");
        inner.state = next;
        // no subscribers is fine
        let _ = self.events.send(next);
    }
}

impl<P: MediaPlatform> Drop for CameraSession<P> {
    fn drop(&mut self) {
        if let Some(mut stream) = self.inner.get_mut().stream.take() {
            stream.stop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::{MediaError, MockPlatform};
    use proptest::prelude::*;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::Semaphore;

    fn fast_config() -> CameraConfig {
        CameraConfig {
            switch_delay_ms: 0,
            ..Default::default()
        }
    }

    fn drain(rx: &mut broadcast::Receiver<SessionState>) -> Vec<SessionState> {
        let mut seen = Vec::new();
        while let Ok(state) = rx.try_recv() {
            seen.push(state);
        }
        seen
    }

    #[tokio::test]
    async fn test_start_stop_lifecycle() {
        let session = CameraSession::new(MockPlatform::new(), fast_config());
        let mut rx = session.subscribe();

        let outcome = session.start(None, None).await.unwrap();
        let StartOutcome::Started(active) = outcome else {
            panic!("expected an active stream");
        };
        assert_eq!(active.device_id, "cam-front");
        assert!(active.mirrored);
        assert_eq!(session.platform().open_streams(), 1);

        session.stop();
        session.stop();
        assert_eq!(session.state(), SessionState::Idle);
        assert!(session.active().is_none());
        assert_eq!(session.platform().open_streams(), 0);

        assert_eq!(
            drain(&mut rx),
            vec![
                SessionState::Starting,
                SessionState::Active,
                SessionState::Stopping,
                SessionState::Idle,
            ]
        );
    }

    #[tokio::test]
    async fn test_back_camera_not_mirrored() {
        let session = CameraSession::new(MockPlatform::new(), fast_config());
        let outcome = session.start(None, Some(Facing::Back)).await.unwrap();
        let StartOutcome::Started(active) = outcome else {
            panic!("expected an active stream");
        };
        assert_eq!(active.device_id, "cam-back");
        assert!(!active.mirrored);
    }

    #[tokio::test]
    async fn test_constraint_resolution_order() {
        let session = CameraSession::new(MockPlatform::new(), fast_config());

        // explicit id beats the facing hint
        session.start(Some("cam-back"), Some(Facing::Front)).await.unwrap();
        assert_eq!(session.active().unwrap().device_id, "cam-back");

        // the selection sticks across restarts
        session.start(None, Some(Facing::Front)).await.unwrap();
        assert_eq!(session.active().unwrap().device_id, "cam-back");
        assert_eq!(session.selected_device().as_deref(), Some("cam-back"));

        // a new explicit id replaces it
        session.start(Some("cam-front"), None).await.unwrap();
        assert_eq!(session.active().unwrap().device_id, "cam-front");
        assert_eq!(session.platform().peak_open_streams(), 1);
        assert_eq!(session.platform().open_streams(), 1);
    }

    #[tokio::test]
    async fn test_permission_denied_fails_then_idles() {
        let session = CameraSession::new(MockPlatform::new().deny_permission(), fast_config());
        let mut rx = session.subscribe();

        let err = session.start(None, None).await.unwrap_err();
        assert_eq!(err, CameraError::PermissionDenied);
        assert_eq!(session.state(), SessionState::Idle);
        assert_eq!(
            drain(&mut rx),
            vec![
                SessionState::Starting,
                SessionState::Failed,
                SessionState::Idle,
            ]
        );
        assert_eq!(session.stats().failures, 1);
    }

    #[tokio::test]
    async fn test_error_kinds_map() {
        let busy = MockPlatform::new().fail_open(MediaError::NotReadable("in use".into()));
        let session = CameraSession::new(busy, fast_config());
        assert_eq!(
            session.start(None, None).await.unwrap_err(),
            CameraError::DeviceUnavailable("in use".into())
        );

        let session = CameraSession::new(MockPlatform::with_devices(vec![]), fast_config());
        assert_eq!(
            session.start(None, None).await.unwrap_err(),
            CameraError::NoDeviceFound
        );

        let session = CameraSession::new(MockPlatform::new().unsupported(), fast_config());
        assert_eq!(
            session.start(None, None).await.unwrap_err(),
            CameraError::UnsupportedPlatform
        );
    }

    #[tokio::test]
    async fn test_stop_during_start_releases_late_stream() {
        let gate = Arc::new(Semaphore::new(0));
        let platform = MockPlatform::new().with_open_gate(Arc::clone(&gate));
        let session = CameraSession::new(platform, fast_config());

        let (outcome, ()) = tokio::join!(session.start(None, None), async {
            tokio::task::yield_now().await;
            assert_eq!(session.state(), SessionState::Starting);
            session.stop();
            gate.add_permits(1);
        });

        assert_eq!(outcome.unwrap(), StartOutcome::Superseded);
        assert_eq!(session.state(), SessionState::Idle);
        assert_eq!(session.platform().streams_opened(), 1);
        assert_eq!(session.platform().open_streams(), 0);
        assert_eq!(session.stats().late_releases, 1);
    }

    #[tokio::test]
    async fn test_newer_start_supersedes_pending_one() {
        let gate = Arc::new(Semaphore::new(0));
        let platform = MockPlatform::new().with_open_gate(Arc::clone(&gate));
        let session = CameraSession::new(platform, fast_config());

        let (first, second, ()) = tokio::join!(
            session.start(Some("cam-front"), None),
            async {
                tokio::task::yield_now().await;
                session.start(Some("cam-back"), None).await
            },
            async {
                tokio::task::yield_now().await;
                tokio::task::yield_now().await;
                gate.add_permits(2);
            }
        );

        assert_eq!(first.unwrap(), StartOutcome::Superseded);
        assert!(matches!(second.unwrap(), StartOutcome::Started(a) if a.device_id == "cam-back"));
        assert_eq!(session.platform().open_streams(), 1);
        assert_eq!(session.stats().late_releases, 1);

        session.stop();
        assert_eq!(session.platform().open_streams(), 0);
    }

    #[tokio::test]
    async fn test_switch_twice_restores_facing() {
        let session = CameraSession::new(MockPlatform::new(), fast_config());
        session.start(None, None).await.unwrap();
        let original = session.facing();

        session.switch_facing().await.unwrap();
        assert_eq!(session.facing(), original.flipped());
        assert_eq!(session.active().unwrap().device_id, "cam-back");

        session.switch_facing().await.unwrap();
        assert_eq!(session.facing(), original);
        assert_eq!(session.active().unwrap().device_id, "cam-front");
        assert_eq!(session.platform().peak_open_streams(), 1);
    }

    #[tokio::test]
    async fn test_switch_overrides_selected_device() {
        let session = CameraSession::new(MockPlatform::new(), fast_config());
        session.start(Some("cam-front"), None).await.unwrap();

        session.switch_facing().await.unwrap();
        assert!(session.selected_device().is_none());
        assert_eq!(session.active().unwrap().device_id, "cam-back");
    }

    #[tokio::test]
    async fn test_hidden_then_visible_resumes_selected_device() {
        let session = CameraSession::new(MockPlatform::new(), fast_config());
        session.start(Some("cam-back"), None).await.unwrap();

        session.handle_page_event(PageEvent::Hidden).await.unwrap();
        assert_eq!(session.state(), SessionState::Idle);
        assert_eq!(session.platform().open_streams(), 0);

        let resumed = session.handle_page_event(PageEvent::Visible).await.unwrap();
        assert!(matches!(resumed, Some(StartOutcome::Started(_))));
        assert_eq!(session.active().unwrap().device_id, "cam-back");
    }

    #[tokio::test]
    async fn test_no_resume_without_selection() {
        let session = CameraSession::new(MockPlatform::new(), fast_config());
        session.start(None, None).await.unwrap();

        session.handle_page_event(PageEvent::Hidden).await.unwrap();
        let resumed = session.handle_page_event(PageEvent::Visible).await.unwrap();
        assert!(resumed.is_none());
        assert_eq!(session.state(), SessionState::Idle);
    }

    #[tokio::test]
    async fn test_no_resume_after_explicit_stop() {
        let session = CameraSession::new(MockPlatform::new(), fast_config());
        session.start(Some("cam-front"), None).await.unwrap();

        session.handle_page_event(PageEvent::Hidden).await.unwrap();
        session.stop();
        let resumed = session.handle_page_event(PageEvent::Visible).await.unwrap();
        assert!(resumed.is_none());
        assert_eq!(session.platform().streams_opened(), 1);
    }

    #[tokio::test]
    async fn test_visible_without_prior_hide_does_nothing() {
        let session = CameraSession::new(MockPlatform::new(), fast_config());
        session.start(Some("cam-front"), None).await.unwrap();
        session.stop();

        let resumed = session.handle_page_event(PageEvent::Visible).await.unwrap();
        assert!(resumed.is_none());
        assert_eq!(session.platform().streams_opened(), 1);
    }

    #[tokio::test]
    async fn test_unload_stops() {
        let session = CameraSession::new(MockPlatform::new(), fast_config());
        session.start(None, None).await.unwrap();
        session.handle_page_event(PageEvent::Unload).await.unwrap();
        assert_eq!(session.state(), SessionState::Idle);
        assert_eq!(session.platform().open_streams(), 0);
    }

    #[tokio::test]
    async fn test_read_frame_requires_active() {
        let session = CameraSession::new(MockPlatform::new(), fast_config());
        assert_eq!(
            session.read_frame().unwrap_err(),
            CameraError::NoActiveSession
        );

        session.start(None, None).await.unwrap();
        let (frame, facing) = session.read_frame().unwrap();
        assert_eq!((frame.width(), frame.height()), (640, 480));
        assert_eq!(facing, Facing::Front);
    }

    fn delayed_config() -> CameraConfig {
        CameraConfig {
            switch_delay_ms: 50,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_unload_during_switch_delay_cancels_restart() {
        let session = CameraSession::new(MockPlatform::new(), delayed_config());
        session.start(None, None).await.unwrap();

        let (outcome, unload) = tokio::join!(session.switch_facing(), async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            session.handle_page_event(PageEvent::Unload).await
        });

        assert_eq!(unload.unwrap(), None);
        assert_eq!(outcome.unwrap(), StartOutcome::Superseded);
        assert_eq!(session.state(), SessionState::Idle);
        assert_eq!(session.platform().open_streams(), 0);
        assert_eq!(session.platform().streams_opened(), 1);
    }

    #[tokio::test]
    async fn test_stop_during_switch_delay_cancels_restart() {
        let session = CameraSession::new(MockPlatform::new(), delayed_config());
        session.start(None, None).await.unwrap();

        let (outcome, ()) = tokio::join!(session.switch_facing(), async {
            tokio::task::yield_now().await;
            session.stop();
        });

        assert_eq!(outcome.unwrap(), StartOutcome::Superseded);
        assert!(!session.is_active());
        assert_eq!(session.platform().open_streams(), 0);
    }

    #[tokio::test]
    async fn test_hidden_during_switch_delay_stays_off() {
        let session = CameraSession::new(MockPlatform::new(), delayed_config());
        session.start(Some("cam-front"), None).await.unwrap();

        let (outcome, _) = tokio::join!(session.switch_facing(), async {
            tokio::task::yield_now().await;
            session.handle_page_event(PageEvent::Hidden).await
        });
        assert_eq!(outcome.unwrap(), StartOutcome::Superseded);
        assert_eq!(session.platform().open_streams(), 0);

        // the switch dropped the selection, so nothing comes back
        let resumed = session.handle_page_event(PageEvent::Visible).await.unwrap();
        assert!(resumed.is_none());
        assert_eq!(session.platform().streams_opened(), 1);
    }

    #[tokio::test]
    async fn test_newer_start_during_switch_delay_wins() {
        let session = CameraSession::new(MockPlatform::new(), delayed_config());
        session.start(None, None).await.unwrap();

        let (switched, started) = tokio::join!(session.switch_facing(), async {
            tokio::task::yield_now().await;
            session.start(Some("cam-front"), None).await
        });

        assert_eq!(switched.unwrap(), StartOutcome::Superseded);
        assert!(matches!(started.unwrap(), StartOutcome::Started(a) if a.device_id == "cam-front"));
        assert_eq!(session.platform().open_streams(), 1);
    }

    #[tokio::test]
    async fn test_hidden_during_start_releases_stream() {
        let gate = Arc::new(Semaphore::new(0));
        let platform = MockPlatform::new().with_open_gate(Arc::clone(&gate));
        let session = CameraSession::new(platform, fast_config());

        let (outcome, hidden) = tokio::join!(session.start(Some("cam-front"), None), async {
            tokio::task::yield_now().await;
            assert_eq!(session.state(), SessionState::Starting);
            let hidden = session.handle_page_event(PageEvent::Hidden).await;
            gate.add_permits(1);
            hidden
        });

        assert_eq!(hidden.unwrap(), None);
        assert_eq!(outcome.unwrap(), StartOutcome::Superseded);
        assert_eq!(session.state(), SessionState::Idle);
        assert_eq!(session.platform().open_streams(), 0);
        assert_eq!(session.stats().late_releases, 1);

        // the selected device comes back once the page is visible
        gate.add_permits(1);
        let resumed = session.handle_page_event(PageEvent::Visible).await.unwrap();
        assert!(matches!(resumed, Some(StartOutcome::Started(a)) if a.device_id == "cam-front"));
        assert_eq!(session.platform().open_streams(), 1);
    }

    #[tokio::test]
    async fn test_unload_during_resume_releases_stream() {
        let gate = Arc::new(Semaphore::new(1));
        let platform = MockPlatform::new().with_open_gate(Arc::clone(&gate));
        let session = CameraSession::new(platform, fast_config());
        session.start(Some("cam-back"), None).await.unwrap();
        session.handle_page_event(PageEvent::Hidden).await.unwrap();

        let (resumed, ()) = tokio::join!(session.handle_page_event(PageEvent::Visible), async {
            tokio::task::yield_now().await;
            assert_eq!(session.state(), SessionState::Starting);
            session.handle_page_event(PageEvent::Unload).await.unwrap();
            gate.add_permits(1);
        });

        assert_eq!(resumed.unwrap(), Some(StartOutcome::Superseded));
        assert_eq!(session.state(), SessionState::Idle);
        assert_eq!(session.platform().open_streams(), 0);
        assert_eq!(session.platform().streams_opened(), 2);
    }

    #[derive(Debug, Clone, Copy)]
    enum Interrupt {
        Stop,
        Hide,
        Unload,
    }

    #[derive(Debug, Clone)]
    enum Op {
        Start(Option<usize>),
        Stop,
        Switch,
        Hide,
        Show,
        Deny(bool),
        InterruptStart(Option<usize>, Interrupt),
        InterruptSwitch(Interrupt),
        InterruptShow(Interrupt),
    }

    fn interrupt_strategy() -> impl Strategy<Value = Interrupt> {
        prop_oneof![
            Just(Interrupt::Stop),
            Just(Interrupt::Hide),
            Just(Interrupt::Unload),
        ]
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            proptest::option::of(0usize..3).prop_map(Op::Start),
            Just(Op::Stop),
            Just(Op::Switch),
            Just(Op::Hide),
            Just(Op::Show),
            any::<bool>().prop_map(Op::Deny),
            (proptest::option::of(0usize..3), interrupt_strategy())
                .prop_map(|(idx, i)| Op::InterruptStart(idx, i)),
            interrupt_strategy().prop_map(Op::InterruptSwitch),
            interrupt_strategy().prop_map(Op::InterruptShow),
        ]
    }

    async fn interrupt(session: &CameraSession<MockPlatform>, kind: Interrupt) {
        match kind {
            Interrupt::Stop => session.stop(),
            Interrupt::Hide => {
                let _ = session.handle_page_event(PageEvent::Hidden).await;
            }
            Interrupt::Unload => {
                let _ = session.handle_page_event(PageEvent::Unload).await;
            }
        }
    }

    fn drain_permits(gate: &Semaphore) {
        while let Ok(permit) = gate.try_acquire() {
            permit.forget();
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_at_most_one_open_stream(ops in proptest::collection::vec(op_strategy(), 1..40)) {
            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_time()
                .build()
                .unwrap();
            rt.block_on(async {
                let ids = ["cam-front", "cam-back", "cam-missing"];
                let gate = Arc::new(Semaphore::new(0));
                let platform = MockPlatform::new().with_open_gate(Arc::clone(&gate));
                let config = CameraConfig {
                    switch_delay_ms: 3,
                    ..Default::default()
                };
                let session = CameraSession::new(platform, config);
                for op in ops {
                    drain_permits(&gate);
                    let interrupted = matches!(
                        op,
                        Op::InterruptStart(..) | Op::InterruptSwitch(_) | Op::InterruptShow(_)
                    );
                    match op {
                        Op::Start(idx) => {
                            gate.add_permits(1);
                            let _ = session.start(idx.map(|i| ids[i]), None).await;
                        }
                        Op::Stop => session.stop(),
                        Op::Switch => {
                            gate.add_permits(1);
                            let _ = session.switch_facing().await;
                        }
                        Op::Hide => {
                            let _ = session.handle_page_event(PageEvent::Hidden).await;
                        }
                        Op::Show => {
                            gate.add_permits(1);
                            let _ = session.handle_page_event(PageEvent::Visible).await;
                        }
                        Op::Deny(denied) => session.platform().set_denied(denied),
                        Op::InterruptStart(idx, kind) => {
                            let (_, ()) = tokio::join!(session.start(idx.map(|i| ids[i]), None), async {
                                tokio::task::yield_now().await;
                                interrupt(&session, kind).await;
                                gate.add_permits(1);
                            });
                        }
                        Op::InterruptSwitch(kind) => {
                            gate.add_permits(1);
                            let (_, ()) = tokio::join!(session.switch_facing(), async {
                                tokio::task::yield_now().await;
                                interrupt(&session, kind).await;
                            });
                        }
                        Op::InterruptShow(kind) => {
                            let (_, ()) = tokio::join!(session.handle_page_event(PageEvent::Visible), async {
                                tokio::task::yield_now().await;
                                interrupt(&session, kind).await;
                                gate.add_permits(1);
                            });
                        }
                    }
                    let open = session.platform().open_streams();
                    assert!(open <= 1);
                    assert_eq!(open == 1, session.is_active());
                    if interrupted {
                        assert_eq!(open, 0);
                        assert_eq!(session.state(), SessionState::Idle);
                    }
                }
                session.stop();
                assert_eq!(session.platform().open_streams(), 0);
                assert!(session.platform().peak_open_streams() <= 1);
            });
        }
    }
}
