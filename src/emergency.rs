use crate::contacts::ContactDirectory;
use crate::models::{DeviceIntent, EmergencyContact, HapticIntensity};
use std::sync::Arc;
use std::sync::Mutex as StdMutex;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::Duration;

/// SAMU, the Brazilian medical emergency number.
pub const EMERGENCY_NUMBER: &str = "192";

pub const DOUBLE_TAP_WINDOW: Duration = Duration::from_millis(500);

pub fn silent_alert_message(contact: &EmergencyContact) -> String {
    let sender = if contact.name.is_empty() {
        "mim"
    } else {
        "um de seus contatos"
    };
    format!(
        "ALERTA DE EMERGÊNCIA ApoioVital: Preciso de ajuda urgente. \
         Este é um alerta silencioso enviado por {sender}."
    )
}

/// Receives the disambiguated gesture.
pub trait TapSink: Send + Sync + 'static {
    /// The window elapsed after a single tap: call the emergency number.
    fn single_tap(&self);
    /// A second tap arrived inside the window: alert the trusted contact.
    fn double_tap(&self);
}

enum TapState {
    Idle,
    AwaitingSecondTap { timer: JoinHandle<()> },
}

/// Turns a stream of taps on the emergency button into exactly one of two
/// actions. At most one timer is outstanding; a second tap inside the window
/// cancels it. If the timer wins the state lock against a late second tap,
/// the single-tap action fires and the late tap opens a fresh window, so the
/// race resolves as two independent single taps.
pub struct TapDisambiguator {
    window: Duration,
    state: Arc<Mutex<TapState>>,
    sink: Arc<dyn TapSink>,
}

impl TapDisambiguator {
    pub fn new(sink: Arc<dyn TapSink>) -> Self {
        Self::with_window(sink, DOUBLE_TAP_WINDOW)
    }

    pub fn with_window(sink: Arc<dyn TapSink>, window: Duration) -> Self {
        Self {
            window,
            state: Arc::new(Mutex::new(TapState::Idle)),
            sink,
        }
    }

    pub async fn tap(&self) {
        let mut state = self.state.lock().await;
        match std::mem::replace(&mut *state, TapState::Idle) {
            TapState::AwaitingSecondTap { timer } => {
                timer.abort();
                drop(state);
                self.sink.double_tap();
            }
            TapState::Idle => {
                let sink = self.sink.clone();
                let slot = self.state.clone();
                let window = self.window;
                let timer = tokio::spawn(async move {
                    tokio::time::sleep(window).await;
                    let mut state = slot.lock().await;
                    if matches!(*state, TapState::AwaitingSecondTap { .. }) {
                        *state = TapState::Idle;
                        drop(state);
                        sink.single_tap();
                    }
                });
                *state = TapState::AwaitingSecondTap { timer };
            }
        }
    }
}

/// Sends platform requests (call, SMS, vibration) toward the device layer.
pub trait IntentGateway: Send + Sync {
    fn emit(&self, intent: DeviceIntent);
}

/// Routes disambiguated gestures to concrete device intents, resolving the
/// trusted contact at dispatch time.
pub struct EmergencyDispatcher {
    contacts: Arc<StdMutex<ContactDirectory>>,
    intents: Arc<dyn IntentGateway>,
}

impl EmergencyDispatcher {
    pub fn new(contacts: Arc<StdMutex<ContactDirectory>>, intents: Arc<dyn IntentGateway>) -> Self {
        Self { contacts, intents }
    }

    pub fn place_call(&self, number: &str) {
        tracing::info!(number, "dispatching call intent");
        self.intents.emit(DeviceIntent::Call {
            number: number.to_string(),
        });
    }

    /// Silent SMS alert to the primary contact; degrades to a direct call
    /// when no primary exists.
    pub fn alert_primary_contact(&self) {
        let primary = match self.contacts.lock() {
            Ok(directory) => directory.primary().cloned(),
            Err(_) => {
                tracing::warn!("contact directory lock poisoned during alert dispatch");
                None
            }
        };
        match primary {
            Some(contact) => self.send_silent_alert(&contact),
            None => self.place_call(EMERGENCY_NUMBER),
        }
    }

    pub fn send_silent_alert(&self, contact: &EmergencyContact) {
        tracing::info!(contact = %contact.name, "dispatching silent alert intent");
        self.intents.emit(DeviceIntent::SilentAlert {
            number: contact.phone.clone(),
            body: silent_alert_message(contact),
        });
    }

    pub fn vibrate(&self, intensity: HapticIntensity) {
        self.intents.emit(DeviceIntent::Haptics { intensity });
    }
}

impl TapSink for EmergencyDispatcher {
    fn single_tap(&self) {
        self.place_call(EMERGENCY_NUMBER);
    }

    fn double_tap(&self) {
        self.alert_primary_contact();
    }
}

#[cfg(test)]
mod tests {
    use super::{
        silent_alert_message, EmergencyDispatcher, IntentGateway, TapDisambiguator, TapSink,
        DOUBLE_TAP_WINDOW, EMERGENCY_NUMBER,
    };
    use crate::contacts::ContactDirectory;
    use crate::models::{DeviceIntent, NewContact};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex as StdMutex};
    use tokio::time::{sleep, Duration};

    #[derive(Default)]
    struct CountingSink {
        singles: AtomicUsize,
        doubles: AtomicUsize,
    }

    impl TapSink for CountingSink {
        fn single_tap(&self) {
            self.singles.fetch_add(1, Ordering::SeqCst);
        }

        fn double_tap(&self) {
            self.doubles.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[derive(Default)]
    struct RecordingGateway {
        intents: StdMutex<Vec<DeviceIntent>>,
    }

    impl IntentGateway for RecordingGateway {
        fn emit(&self, intent: DeviceIntent) {
            self.intents.lock().expect("intents lock").push(intent);
        }
    }

    async fn settle() {
        // let the spawned timer task run to completion
        for _ in 0..4 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn single_tap_fires_after_the_window() {
        let sink = Arc::new(CountingSink::default());
        let taps = TapDisambiguator::new(sink.clone());

        taps.tap().await;
        assert_eq!(sink.singles.load(Ordering::SeqCst), 0);

        sleep(DOUBLE_TAP_WINDOW + Duration::from_millis(50)).await;
        settle().await;
        assert_eq!(sink.singles.load(Ordering::SeqCst), 1);
        assert_eq!(sink.doubles.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn second_tap_inside_window_fires_exactly_one_double() {
        let sink = Arc::new(CountingSink::default());
        let taps = TapDisambiguator::new(sink.clone());

        taps.tap().await;
        sleep(Duration::from_millis(100)).await;
        taps.tap().await;
        assert_eq!(sink.doubles.load(Ordering::SeqCst), 1);

        // the canceled timer must never fire
        sleep(DOUBLE_TAP_WINDOW * 2).await;
        settle().await;
        assert_eq!(sink.singles.load(Ordering::SeqCst), 0);
        assert_eq!(sink.doubles.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_taps_resolve_as_two_singles() {
        let sink = Arc::new(CountingSink::default());
        let taps = TapDisambiguator::new(sink.clone());

        taps.tap().await;
        sleep(DOUBLE_TAP_WINDOW + Duration::from_millis(50)).await;
        settle().await;
        taps.tap().await;
        sleep(DOUBLE_TAP_WINDOW + Duration::from_millis(50)).await;
        settle().await;

        assert_eq!(sink.singles.load(Ordering::SeqCst), 2);
        assert_eq!(sink.doubles.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn double_tap_routes_to_primary_contact() {
        let mut directory = ContactDirectory::default();
        directory.add(NewContact {
            name: "Ana".to_string(),
            phone: "11988880000".to_string(),
            relation: "Mãe".to_string(),
            is_primary: true,
            icon: None,
        });
        let contacts = Arc::new(StdMutex::new(directory));
        let gateway = Arc::new(RecordingGateway::default());
        let dispatcher = Arc::new(EmergencyDispatcher::new(contacts, gateway.clone()));
        let taps = TapDisambiguator::new(dispatcher);

        taps.tap().await;
        taps.tap().await;

        let intents = gateway.intents.lock().expect("intents lock");
        assert_eq!(intents.len(), 1);
        match &intents[0] {
            DeviceIntent::SilentAlert { number, body } => {
                assert_eq!(number, "11988880000");
                assert!(body.starts_with("ALERTA DE EMERGÊNCIA ApoioVital"));
            }
            other => panic!("unexpected intent: {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn double_tap_without_primary_degrades_to_a_call() {
        let contacts = Arc::new(StdMutex::new(ContactDirectory::default()));
        let gateway = Arc::new(RecordingGateway::default());
        let dispatcher = Arc::new(EmergencyDispatcher::new(contacts, gateway.clone()));
        let taps = TapDisambiguator::new(dispatcher);

        taps.tap().await;
        taps.tap().await;

        let intents = gateway.intents.lock().expect("intents lock");
        assert_eq!(
            intents.as_slice(),
            &[DeviceIntent::Call {
                number: EMERGENCY_NUMBER.to_string()
            }]
        );
    }

    #[test]
    fn alert_message_names_the_sender_clause() {
        let mut directory = ContactDirectory::default();
        let ana = directory.add(NewContact {
            name: "Ana".to_string(),
            phone: "111".to_string(),
            relation: "Mãe".to_string(),
            is_primary: true,
            icon: None,
        });
        assert!(silent_alert_message(&ana).contains("um de seus contatos"));

        let mut anonymous = ana;
        anonymous.name.clear();
        assert!(silent_alert_message(&anonymous).contains("por mim."));
    }
}
