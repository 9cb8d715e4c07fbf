//! Page controller wiring the camera pieces to a photo form.
//!
//! This is the error boundary: every failure is shown once through the
//! [`Notifier`] and the controller carries on.

use crate::capture::{CaptureSink, CapturedFrame};
use crate::catalog::DeviceCatalog;
use crate::form::{FormError, PhotoForm, Submission};
use crate::notify::Notifier;
use crate::platform::MediaPlatform;
use crate::session::{CameraError, CameraSession, PageEvent, StartOutcome};

/// A photo-capture page.
pub struct PhotoBooth<P: MediaPlatform, N: Notifier> {
    session: CameraSession<P>,
    catalog: DeviceCatalog,
    sink: CaptureSink,
    form: PhotoForm,
    notifier: N,
}

impl<P: MediaPlatform, N: Notifier> PhotoBooth<P, N> {
    /// Wires a session, a form and a notifier together.
    pub fn new(session: CameraSession<P>, form: PhotoForm, notifier: N) -> Self {
        let sink = CaptureSink::from_config(session.config());
        Self {
            session,
            catalog: DeviceCatalog::new(),
            sink,
            form,
            notifier,
        }
    }

    /// Page load: fills the camera list. Never starts the camera by itself.
    pub async fn load(&mut self) {
        if let Err(e) = self.catalog.refresh(self.session.platform()).await {
            self.report(&e);
        }
    }

    /// The user picked a camera from the list. An empty id is the
    /// placeholder entry and does nothing.
    pub async fn select_camera(&mut self, device_id: &str) -> bool {
        if device_id.is_empty() {
            return false;
        }
        let outcome = self.session.start(Some(device_id), None).await;
        self.settle(outcome)
    }

    /// Starts the camera with whatever the session would pick.
    pub async fn start_camera(&mut self) -> bool {
        let outcome = self.session.start(None, None).await;
        self.settle(outcome)
    }

    /// Flips between front and back cameras. Offered only when the
    /// catalog lists more than one camera.
    pub async fn switch_camera(&mut self) -> bool {
        if !self.can_switch() {
            tracing::debug!(cameras = self.catalog.devices().len(), "Switch ignored");
            return false;
        }
        let outcome = self.session.switch_facing().await;
        self.settle(outcome)
    }

    /// Whether the switch control is shown.
    pub fn can_switch(&self) -> bool {
        self.catalog.has_multiple()
    }

    /// Takes a still and puts it in the form's hidden field.
    pub fn capture(&mut self) -> Option<&CapturedFrame> {
        match self.sink.capture(&self.session) {
            Ok(frame) => {
                self.form.set_image_data(frame.to_data_url());
                Some(frame)
            }
            Err(e) => {
                self.notifier.notify(&e.user_message());
                None
            }
        }
    }

    /// Drops the still and goes back to the live preview.
    pub fn retake(&mut self) {
        self.sink.retake();
        self.form.clear_image_data();
    }

    /// Stops the camera.
    pub fn stop_camera(&mut self) {
        self.session.stop();
    }

    /// Forwards a visibility or unload signal to the session.
    pub async fn on_page_event(&mut self, event: PageEvent) {
        match self.session.handle_page_event(event).await {
            Ok(Some(outcome)) => {
                self.settle(Ok(outcome));
            }
            Ok(None) => {}
            Err(e) => self.report(&e),
        }
    }

    /// Submits the form. Empty required inputs are only marked; a missing
    /// photo is reported.
    pub fn submit(&mut self) -> Option<Submission> {
        match self.form.submit() {
            Ok(submission) => {
                self.session.stop();
                Some(submission)
            }
            Err(FormError::MissingImage) => {
                self.notifier.notify("Please take a photo before submitting.");
                None
            }
            Err(e) => {
                tracing::debug!(error = %e, "Form not submitted");
                None
            }
        }
    }

    /// The camera session.
    pub fn session(&self) -> &CameraSession<P> {
        &self.session
    }

    /// The camera list.
    pub fn catalog(&self) -> &DeviceCatalog {
        &self.catalog
    }

    /// The still capture state.
    pub fn sink(&self) -> &CaptureSink {
        &self.sink
    }

    /// The form.
    pub fn form(&self) -> &PhotoForm {
        &self.form
    }

    /// The form, for filling in inputs.
    pub fn form_mut(&mut self) -> &mut PhotoForm {
        &mut self.form
    }

    /// The notifier.
    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    fn settle(&self, outcome: Result<StartOutcome, CameraError>) -> bool {
        match outcome {
            Ok(StartOutcome::Started(_)) => true,
            Ok(StartOutcome::Superseded) => false,
            Err(e) => {
                self.report(&e);
                false
            }
        }
    }

    fn report(&self, error: &CameraError) {
        self.notifier.notify(&error.user_message());
    }
}
