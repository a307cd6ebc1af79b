use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use super::labels::normalize_label;
use super::model::SentimentAnalysisModel;
use crate::error::{Result, SentimentError};
use crate::pipelines::utils::DeviceRequest;

/// Output of [`Classifier::classify`].
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    /// Normalized label. Empty when the model scored the text without naming a label;
    /// a whitespace-only label counts as no label.
    pub label: String,
    /// Model confidence, if the backend reported one.
    pub score: Option<f32>,
    /// Label exactly as the model returned it.
    pub raw_label: String,
}

/// Lifecycle of the classifier's model handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Readiness {
    /// Nothing loaded yet, or a load is in progress.
    Uninitialized = 0,
    /// Model, tokenizer and device are loaded.
    Ready = 1,
    /// Loading failed; the classifier stays unavailable.
    Failed = 2,
}

impl Readiness {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => Readiness::Ready,
            2 => Readiness::Failed,
            _ => Readiness::Uninitialized,
        }
    }
}

enum State<M> {
    Uninitialized,
    Ready(M),
    Failed(String),
}

/// Owns the model handle and serializes access to it.
///
/// The model is loaded once, either eagerly through [`initialize`](Self::initialize)
/// or on the first [`classify`](Self::classify). Calls from several threads queue on
/// an internal lock, so a load is never duplicated and inference never overlaps.
pub struct Classifier<M: SentimentAnalysisModel> {
    options: M::Options,
    device_request: DeviceRequest,
    state: Mutex<State<M>>,
    // Mirrors `state` so readiness checks never wait behind a load or an inference.
    readiness: AtomicU8,
}

impl<M: SentimentAnalysisModel> Classifier<M> {
    /// Create an unloaded classifier. Nothing is downloaded until first use.
    pub fn new(options: M::Options, device_request: DeviceRequest) -> Self {
        Self {
            options,
            device_request,
            state: Mutex::new(State::Uninitialized),
            readiness: AtomicU8::new(Readiness::Uninitialized as u8),
        }
    }

    /// Load the model if it is not loaded yet and report whether it is usable.
    ///
    /// Failures are logged, not returned. Once loading has failed, later calls return
    /// `false` without retrying.
    pub fn initialize(&self) -> bool {
        let mut state = self.lock_state();
        self.ensure_loaded(&mut state)
    }

    /// Whether the model is loaded and usable.
    pub fn is_ready(&self) -> bool {
        self.readiness() == Readiness::Ready
    }

    /// Current lifecycle state. Does not block while another thread is loading.
    pub fn readiness(&self) -> Readiness {
        Readiness::from_u8(self.readiness.load(Ordering::Acquire))
    }

    /// The options this classifier loads its model with.
    pub fn options(&self) -> &M::Options {
        &self.options
    }

    /// Classify already-normalized text, loading the model first if needed.
    ///
    /// # Errors
    ///
    /// - [`SentimentError::Initialization`] if the model could not be loaded.
    /// - [`SentimentError::NoResult`] if the model returned nothing.
    /// - [`SentimentError::MalformedLabel`] if the top result has neither label nor score.
    /// - Tokenization or inference errors from the backend.
    pub fn classify(&self, text: &str) -> Result<Classification> {
        let mut state = self.lock_state();
        self.ensure_loaded(&mut state);

        let model = match &*state {
            State::Ready(model) => model,
            State::Failed(reason) => return Err(SentimentError::Initialization(reason.clone())),
            State::Uninitialized => {
                return Err(SentimentError::Unexpected(
                    "Classifier left uninitialized after loading".into(),
                ))
            }
        };

        let top = model
            .predict(text)?
            .into_iter()
            .next()
            .ok_or(SentimentError::NoResult)?;

        let raw_label = top.label.filter(|label| !label.trim().is_empty());
        match (raw_label, top.score) {
            (Some(raw_label), score) => Ok(Classification {
                label: normalize_label(&raw_label),
                score,
                raw_label,
            }),
            (None, Some(score)) => Ok(Classification {
                label: String::new(),
                score: Some(score),
                raw_label: String::new(),
            }),
            (None, None) => Err(SentimentError::MalformedLabel(
                "model returned neither a label nor a score".into(),
            )),
        }
    }

    /// Run `f` against the loaded model, if any.
    pub(crate) fn with_model<R>(&self, f: impl FnOnce(&M) -> R) -> Option<R> {
        match &*self.lock_state() {
            State::Ready(model) => Some(f(model)),
            _ => None,
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, State<M>> {
        // A panic inside a backend leaves the state itself consistent.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn ensure_loaded(&self, state: &mut State<M>) -> bool {
        match state {
            State::Ready(_) => return true,
            State::Failed(_) => return false,
            State::Uninitialized => {}
        }

        let started = Instant::now();
        match self.load() {
            Ok(model) => {
                tracing::info!(
                    options = ?self.options,
                    device = ?model.device().location(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "sentiment model loaded"
                );
                *state = State::Ready(model);
                self.readiness
                    .store(Readiness::Ready as u8, Ordering::Release);
                true
            }
            Err(e) => {
                tracing::warn!(
                    options = ?self.options,
                    error = %e,
                    "failed to load sentiment model"
                );
                *state = State::Failed(e.to_string());
                self.readiness
                    .store(Readiness::Failed as u8, Ordering::Release);
                false
            }
        }
    }

    fn load(&self) -> Result<M> {
        let device = self.device_request.resolve()?;
        M::new(self.options.clone(), device)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipelines::sentiment::model::RawPrediction;
    use candle_core::Device;
    use std::sync::atomic::AtomicUsize;
    use std::sync::mpsc::{self, Receiver, Sender};
    use std::sync::Arc;
    use std::time::Duration;

    #[derive(Debug, Clone)]
    struct Script {
        output: Vec<RawPrediction>,
        fail_load: bool,
        loads: Arc<AtomicUsize>,
        /// Announces the load, then holds it until released.
        gate: Option<Arc<Mutex<(Sender<()>, Receiver<()>)>>>,
    }

    impl Script {
        fn returning(output: Vec<RawPrediction>) -> Self {
            Self {
                output,
                fail_load: false,
                loads: Arc::new(AtomicUsize::new(0)),
                gate: None,
            }
        }

        fn failing() -> Self {
            Self {
                fail_load: true,
                ..Self::returning(vec![])
            }
        }
    }

    struct ScriptedModel {
        output: Vec<RawPrediction>,
        device: Device,
    }

    impl SentimentAnalysisModel for ScriptedModel {
        type Options = Script;

        fn new(options: Script, device: Device) -> Result<Self> {
            options.loads.fetch_add(1, Ordering::SeqCst);
            if let Some(gate) = &options.gate {
                let gate = gate.lock().unwrap();
                gate.0.send(()).unwrap();
                gate.1.recv().unwrap();
            }
            if options.fail_load {
                return Err(SentimentError::Download("repository not found".into()));
            }
            Ok(Self {
                output: options.output,
                device,
            })
        }

        fn predict(&self, _text: &str) -> Result<Vec<RawPrediction>> {
            Ok(self.output.clone())
        }

        fn device(&self) -> &Device {
            &self.device
        }
    }

    fn classifier(script: Script) -> Classifier<ScriptedModel> {
        Classifier::new(script, DeviceRequest::Cpu)
    }

    #[test]
    fn initialize_is_idempotent() {
        let script = Script::returning(vec![RawPrediction::new("LABEL_2", 0.9)]);
        let loads = script.loads.clone();
        let c = classifier(script);

        assert_eq!(c.readiness(), Readiness::Uninitialized);
        assert!(c.initialize());
        assert!(c.initialize());
        assert!(c.is_ready());
        assert_eq!(loads.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn classify_initializes_lazily() {
        let c = classifier(Script::returning(vec![RawPrediction::new("LABEL_2", 0.93)]));

        let out = c.classify("hôm nay tôi rất vui").unwrap();
        assert!(c.is_ready());
        assert_eq!(out.label, "POSITIVE");
        assert_eq!(out.score, Some(0.93));
        assert_eq!(out.raw_label, "LABEL_2");
    }

    #[test]
    fn failed_initialization_is_reported_not_raised() {
        let script = Script::failing();
        let loads = script.loads.clone();
        let c = classifier(script);

        assert!(!c.initialize());
        assert!(!c.initialize());
        assert_eq!(c.readiness(), Readiness::Failed);
        assert_eq!(loads.load(Ordering::SeqCst), 1);

        let err = c.classify("xin chào").unwrap_err();
        assert!(matches!(
            err,
            SentimentError::Initialization(ref m) if m.contains("repository not found")
        ));
    }

    #[test]
    fn empty_output_is_no_result() {
        let c = classifier(Script::returning(vec![]));
        assert!(matches!(c.classify("abc"), Err(SentimentError::NoResult)));
    }

    #[test]
    fn first_result_wins() {
        let c = classifier(Script::returning(vec![
            RawPrediction::new("negative", 0.7),
            RawPrediction::new("positive", 0.2),
        ]));
        assert_eq!(c.classify("abc").unwrap().label, "NEGATIVE");
    }

    #[test]
    fn missing_label_with_score_is_left_empty() {
        let c = classifier(Script::returning(vec![RawPrediction {
            label: None,
            score: Some(0.4),
        }]));
        let out = c.classify("abc").unwrap();
        assert_eq!(out.label, "");
        assert_eq!(out.score, Some(0.4));
    }

    #[test]
    fn missing_label_and_score_is_malformed() {
        let c = classifier(Script::returning(vec![RawPrediction {
            label: Some("  ".into()),
            score: None,
        }]));
        assert!(matches!(
            c.classify("abc"),
            Err(SentimentError::MalformedLabel(_))
        ));
    }

    #[test]
    fn concurrent_first_calls_load_once() {
        let script = Script::returning(vec![RawPrediction::new("LABEL_0", 0.8)]);
        let loads = script.loads.clone();
        let c = Arc::new(classifier(script));

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let c = Arc::clone(&c);
                std::thread::spawn(move || c.classify("tệ quá").map(|r| r.label))
            })
            .collect();

        for h in handles {
            assert_eq!(h.join().unwrap().unwrap(), "NEGATIVE");
        }
        assert_eq!(loads.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn readiness_does_not_wait_for_a_load_in_progress() {
        let (started_tx, started_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel();
        let mut script = Script::returning(vec![RawPrediction::new("LABEL_2", 0.9)]);
        script.gate = Some(Arc::new(Mutex::new((started_tx, release_rx))));
        let c = Arc::new(classifier(script));

        let loader = {
            let c = Arc::clone(&c);
            std::thread::spawn(move || c.initialize())
        };
        started_rx.recv_timeout(Duration::from_secs(5)).unwrap();

        assert_eq!(c.readiness(), Readiness::Uninitialized);
        assert!(!c.is_ready());

        release_tx.send(()).unwrap();
        assert!(loader.join().unwrap());
        assert_eq!(c.readiness(), Readiness::Ready);
    }

    #[test]
    fn whitespace_label_counts_as_missing() {
        let c = classifier(Script::returning(vec![RawPrediction {
            label: Some(" \t".into()),
            score: Some(0.7),
        }]));
        let out = c.classify("abc").unwrap();
        assert_eq!(out.label, "");
        assert_eq!(out.raw_label, "");
    }
}
