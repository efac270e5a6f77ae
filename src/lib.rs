pub mod assistant;
pub mod contacts;
pub mod core;
pub mod db;
pub mod emergency;
pub mod errors;
pub mod guides;
pub mod history;
pub mod models;

use crate::core::AppCore;
use crate::emergency::IntentGateway;
use crate::models::{
    AccessibilitySettings, AiQueryItem, AskAssistantPayload, BooleanResponse, ContactQuery,
    DeviceIntent, EditImagePayload, EditedImageResponse, EmergencyContact, EmergencyInstruction,
    HapticIntensity, NewContact,
};
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use tauri::{Emitter, Manager};
use tracing_appender::non_blocking::WorkerGuard;

static LOG_GUARD: std::sync::OnceLock<WorkerGuard> = std::sync::OnceLock::new();

/// Forwards device intents to the webview, which owns the actual `tel:`,
/// `sms:` and vibration calls.
struct TauriIntentGateway {
    handle: tauri::AppHandle,
}

impl IntentGateway for TauriIntentGateway {
    fn emit(&self, intent: DeviceIntent) {
        if let Err(error) = self.handle.emit("device_intent", intent) {
            tracing::warn!(error = %error, "failed to emit device intent");
        }
    }
}

struct InitState {
    core: Option<Arc<AppCore>>,
    last_error: Option<String>,
    app_data_dir: PathBuf,
}

/// Initialization is recoverable: a failed startup leaves `core` empty and
/// every command answers with the stored error until the UI retries.
#[derive(Clone)]
struct AppState {
    inner: Arc<RwLock<InitState>>,
}

impl AppState {
    fn new(app_data_dir: PathBuf) -> Self {
        Self {
            inner: Arc::new(RwLock::new(InitState {
                core: None,
                last_error: None,
                app_data_dir,
            })),
        }
    }

    fn initialize(&self, intents: Arc<dyn IntentGateway>) -> Result<(), String> {
        let app_data_dir = {
            let inner = self.inner.read().map_err(|_| poisoned())?;
            inner.app_data_dir.clone()
        };
        let result = AppCore::new(app_data_dir, intents).map_err(to_client_error);
        let mut inner = self.inner.write().map_err(|_| poisoned())?;
        match result {
            Ok(core) => {
                inner.core = Some(core);
                inner.last_error = None;
                Ok(())
            }
            Err(error) => {
                inner.last_error = Some(error.clone());
                Err(error)
            }
        }
    }

    fn core(&self) -> Result<Arc<AppCore>, String> {
        let inner = self.inner.read().map_err(|_| poisoned())?;
        inner.core.clone().ok_or_else(|| {
            inner
                .last_error
                .clone()
                .unwrap_or_else(|| "APP_NOT_READY: initialization has not completed".to_string())
        })
    }
}

fn poisoned() -> String {
    "INTERNAL: app state lock poisoned".to_string()
}

#[tauri::command]
fn app_ready(state: tauri::State<'_, AppState>) -> Result<BooleanResponse, String> {
    Ok(BooleanResponse {
        success: state.core().is_ok(),
    })
}

#[tauri::command]
fn retry_initialization(
    state: tauri::State<'_, AppState>,
    app: tauri::AppHandle,
) -> Result<BooleanResponse, String> {
    state.initialize(Arc::new(TauriIntentGateway { handle: app }))?;
    Ok(BooleanResponse { success: true })
}

#[tauri::command]
fn list_contacts(
    state: tauri::State<'_, AppState>,
    query: ContactQuery,
) -> Result<Vec<EmergencyContact>, String> {
    state.core()?.list_contacts(query).map_err(to_client_error)
}

#[tauri::command]
fn add_contact(
    state: tauri::State<'_, AppState>,
    payload: NewContact,
) -> Result<EmergencyContact, String> {
    state.core()?.add_contact(payload).map_err(to_client_error)
}

#[tauri::command]
fn delete_contact(state: tauri::State<'_, AppState>, id: String) -> Result<BooleanResponse, String> {
    state.core()?.delete_contact(&id).map_err(to_client_error)
}

#[tauri::command]
fn set_primary_contact(
    state: tauri::State<'_, AppState>,
    id: String,
) -> Result<BooleanResponse, String> {
    state
        .core()?
        .set_primary_contact(&id)
        .map_err(to_client_error)
}

#[tauri::command]
fn primary_contact(state: tauri::State<'_, AppState>) -> Result<Option<EmergencyContact>, String> {
    state.core()?.primary_contact().map_err(to_client_error)
}

#[tauri::command]
fn list_guides(
    state: tauri::State<'_, AppState>,
    search: Option<String>,
) -> Result<Vec<EmergencyInstruction>, String> {
    state.core()?.list_guides(search).map_err(to_client_error)
}

#[tauri::command]
fn update_guide_icon(
    state: tauri::State<'_, AppState>,
    id: String,
    new_icon: String,
) -> Result<BooleanResponse, String> {
    state
        .core()?
        .update_guide_icon(&id, &new_icon)
        .map_err(to_client_error)
}

#[tauri::command]
fn list_ai_history(state: tauri::State<'_, AppState>) -> Result<Vec<AiQueryItem>, String> {
    state.core()?.list_ai_history().map_err(to_client_error)
}

#[tauri::command]
fn clear_ai_history(state: tauri::State<'_, AppState>) -> Result<BooleanResponse, String> {
    state.core()?.clear_ai_history().map_err(to_client_error)
}

#[tauri::command]
async fn ask_assistant(
    state: tauri::State<'_, AppState>,
    payload: AskAssistantPayload,
) -> Result<AiQueryItem, String> {
    state
        .core()?
        .ask_assistant(payload)
        .await
        .map_err(to_client_error)
}

#[tauri::command]
async fn edit_image(
    state: tauri::State<'_, AppState>,
    payload: EditImagePayload,
) -> Result<EditedImageResponse, String> {
    state
        .core()?
        .edit_image(payload)
        .await
        .map_err(to_client_error)
}

#[tauri::command]
fn get_accessibility_settings(
    state: tauri::State<'_, AppState>,
) -> Result<AccessibilitySettings, String> {
    state
        .core()?
        .get_accessibility_settings()
        .map_err(to_client_error)
}

#[tauri::command]
fn update_accessibility_settings(
    state: tauri::State<'_, AppState>,
    settings: AccessibilitySettings,
) -> Result<AccessibilitySettings, String> {
    state
        .core()?
        .update_accessibility_settings(settings)
        .map_err(to_client_error)
}

#[tauri::command]
fn trigger_haptics(
    state: tauri::State<'_, AppState>,
    intensity: HapticIntensity,
) -> Result<(), String> {
    state
        .core()?
        .trigger_haptics(intensity)
        .map_err(to_client_error)
}

#[tauri::command]
async fn emergency_tap(state: tauri::State<'_, AppState>) -> Result<(), String> {
    let core = state.core()?;
    core.emergency_tap().await;
    Ok(())
}

#[tauri::command]
fn place_call(state: tauri::State<'_, AppState>, number: Option<String>) -> Result<(), String> {
    state.core()?.place_call(number);
    Ok(())
}

#[tauri::command]
fn send_silent_alert(
    state: tauri::State<'_, AppState>,
    contact_id: String,
) -> Result<BooleanResponse, String> {
    state
        .core()?
        .send_silent_alert(&contact_id)
        .map_err(to_client_error)
}

#[tauri::command]
async fn save_gemini_api_key(
    state: tauri::State<'_, AppState>,
    key: String,
) -> Result<BooleanResponse, String> {
    state
        .core()?
        .save_gemini_api_key(key)
        .await
        .map_err(to_client_error)
}

#[tauri::command]
async fn clear_gemini_api_key(
    state: tauri::State<'_, AppState>,
) -> Result<BooleanResponse, String> {
    state
        .core()?
        .clear_gemini_api_key()
        .await
        .map_err(to_client_error)
}

#[tauri::command]
async fn has_gemini_api_key(
    state: tauri::State<'_, AppState>,
) -> Result<BooleanResponse, String> {
    state
        .core()?
        .has_gemini_api_key()
        .await
        .map_err(to_client_error)
}

#[tauri::command]
fn is_onboarded(state: tauri::State<'_, AppState>) -> Result<bool, String> {
    state.core()?.is_onboarded().map_err(to_client_error)
}

#[tauri::command]
fn complete_onboarding(state: tauri::State<'_, AppState>) -> Result<BooleanResponse, String> {
    state.core()?.complete_onboarding().map_err(to_client_error)
}

pub fn run() {
    tauri::Builder::default()
        .setup(|app| {
            let app_data_dir = app.path().app_data_dir().map_err(|error| error.to_string())?;
            std::fs::create_dir_all(&app_data_dir).map_err(|error| error.to_string())?;
            init_tracing(&app_data_dir).map_err(|error| error.to_string())?;

            let state = AppState::new(app_data_dir);
            let gateway = Arc::new(TauriIntentGateway {
                handle: app.handle().clone(),
            });
            if let Err(error) = state.initialize(gateway) {
                tracing::error!(error = %error, "startup initialization failed; waiting for retry from the UI");
            }

            app.manage(state);
            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            app_ready,
            retry_initialization,
            list_contacts,
            add_contact,
            delete_contact,
            set_primary_contact,
            primary_contact,
            list_guides,
            update_guide_icon,
            list_ai_history,
            clear_ai_history,
            ask_assistant,
            edit_image,
            get_accessibility_settings,
            update_accessibility_settings,
            trigger_haptics,
            emergency_tap,
            place_call,
            send_silent_alert,
            save_gemini_api_key,
            clear_gemini_api_key,
            has_gemini_api_key,
            is_onboarded,
            complete_onboarding
        ])
        .run(tauri::generate_context!())
        .expect("failed to run tauri app");
}

fn init_tracing(app_data_dir: &Path) -> Result<(), String> {
    let log_dir = app_data_dir.join("logs");
    std::fs::create_dir_all(&log_dir).map_err(|error| error.to_string())?;
    let file_appender = tracing_appender::rolling::daily(log_dir, "apoiovital.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    let _ = LOG_GUARD.set(guard);

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .json()
        .with_writer(non_blocking)
        .try_init()
        .map_err(|error| error.to_string())
}

fn to_client_error(error: impl std::fmt::Display) -> String {
    error.to_string()
}
