use crate::assistant::gemini::GeminiClient;
use crate::assistant::parse_data_url;
use crate::contacts::ContactDirectory;
use crate::db::Database;
use crate::emergency::{EmergencyDispatcher, IntentGateway, TapDisambiguator, EMERGENCY_NUMBER};
use crate::errors::{AppError, AppResult};
use crate::guides::GuideCatalog;
use crate::history::AiSessionLog;
use crate::models::{
    AccessibilitySettings, AiQueryItem, AskAssistantPayload, BooleanResponse, ContactQuery,
    EditImagePayload, EditedImageResponse, EmergencyContact, EmergencyInstruction, HapticIntensity,
    NewContact,
};
use chrono::Utc;
use std::path::PathBuf;
use std::sync::{Arc, Mutex as StdMutex, MutexGuard};
use tokio::sync::Mutex;
use uuid::Uuid;

const KEYRING_SERVICE: &str = "apoio-vital";
const GEMINI_KEY_USER: &str = "gemini";

/// Owned application state, constructed once at startup and shared by handle.
/// Each collection is loaded from its stored document once and rewritten in
/// full after every successful mutation. Persistence is fire-and-forget: a
/// failed write is logged and the in-memory state stands.
pub struct AppCore {
    db: Arc<Database>,
    contacts: Arc<StdMutex<ContactDirectory>>,
    guides: StdMutex<GuideCatalog>,
    history: StdMutex<AiSessionLog>,
    settings: StdMutex<AccessibilitySettings>,
    dispatcher: Arc<EmergencyDispatcher>,
    taps: TapDisambiguator,
    gemini: GeminiClient,
    keyring_lock: Mutex<()>,
}

impl AppCore {
    pub fn new(app_data_dir: PathBuf, intents: Arc<dyn IntentGateway>) -> AppResult<Arc<Self>> {
        let db = Arc::new(Database::new(&app_data_dir.join("state.sqlite"))?);

        let contacts = Arc::new(StdMutex::new(ContactDirectory::from_records(
            db.load_contacts()?,
        )));
        let guides = StdMutex::new(GuideCatalog::from_records(db.load_guides()?));
        let history = StdMutex::new(AiSessionLog::from_records(db.load_ai_history()?));
        let settings = StdMutex::new(db.load_accessibility()?);

        let dispatcher = Arc::new(EmergencyDispatcher::new(contacts.clone(), intents));
        let taps = TapDisambiguator::new(dispatcher.clone());

        Ok(Arc::new(Self {
            db,
            contacts,
            guides,
            history,
            settings,
            dispatcher,
            taps,
            gemini: GeminiClient::new(),
            keyring_lock: Mutex::new(()),
        }))
    }

    fn lock<'a, T>(mutex: &'a StdMutex<T>, what: &str) -> AppResult<MutexGuard<'a, T>> {
        mutex
            .lock()
            .map_err(|_| AppError::Internal(format!("{what} mutex poisoned")))
    }

    fn persist(&self, document: &str, result: AppResult<()>) {
        if let Err(error) = result {
            tracing::warn!(document, error = %error, "failed to persist document");
        }
    }

    // ─── Contact Directory ──────────────────────────────────────────────────

    pub fn list_contacts(&self, query: ContactQuery) -> AppResult<Vec<EmergencyContact>> {
        let directory = Self::lock(&self.contacts, "contact directory")?;
        let filtered = match query.search.as_deref() {
            Some(search) => directory.filter(search),
            None => directory.records().to_vec(),
        };
        Ok(match query.sort {
            Some(sort) => directory.sorted(filtered, sort),
            None => filtered,
        })
    }

    pub fn add_contact(&self, payload: NewContact) -> AppResult<EmergencyContact> {
        if payload.name.trim().is_empty() || payload.phone.trim().is_empty() {
            return Err(AppError::Invalid(
                "a contact needs both a name and a phone number".to_string(),
            ));
        }
        let contact = {
            let mut directory = Self::lock(&self.contacts, "contact directory")?;
            let contact = directory.add(payload);
            self.persist("contacts", self.db.save_contacts(directory.records()));
            contact
        };
        tracing::info!(contact_id = %contact.id, "contact added");
        Ok(contact)
    }

    pub fn delete_contact(&self, id: &str) -> AppResult<BooleanResponse> {
        let mut directory = Self::lock(&self.contacts, "contact directory")?;
        let removed = directory.delete(id);
        if removed {
            self.persist("contacts", self.db.save_contacts(directory.records()));
        }
        Ok(BooleanResponse { success: removed })
    }

    pub fn set_primary_contact(&self, id: &str) -> AppResult<BooleanResponse> {
        let mut directory = Self::lock(&self.contacts, "contact directory")?;
        let changed = directory.set_primary(id);
        // unknown ids are a no-op but still count as a rewrite
        self.persist("contacts", self.db.save_contacts(directory.records()));
        Ok(BooleanResponse { success: changed })
    }

    pub fn primary_contact(&self) -> AppResult<Option<EmergencyContact>> {
        let directory = Self::lock(&self.contacts, "contact directory")?;
        Ok(directory.primary().cloned())
    }

    // ─── Guide Catalog ──────────────────────────────────────────────────────

    pub fn list_guides(&self, search: Option<String>) -> AppResult<Vec<EmergencyInstruction>> {
        let catalog = Self::lock(&self.guides, "guide catalog")?;
        Ok(catalog.filter(search.as_deref().unwrap_or_default()))
    }

    pub fn update_guide_icon(&self, id: &str, new_icon: &str) -> AppResult<BooleanResponse> {
        let mut catalog = Self::lock(&self.guides, "guide catalog")?;
        let updated = catalog.update_icon(id, new_icon);
        if updated {
            self.persist("guides", self.db.save_guides(catalog.records()));
        }
        Ok(BooleanResponse { success: updated })
    }

    // ─── AI Session Log ─────────────────────────────────────────────────────

    pub fn list_ai_history(&self) -> AppResult<Vec<AiQueryItem>> {
        let log = Self::lock(&self.history, "AI session log")?;
        Ok(log.records())
    }

    pub fn clear_ai_history(&self) -> AppResult<BooleanResponse> {
        let mut log = Self::lock(&self.history, "AI session log")?;
        log.clear();
        self.persist("ai_history", self.db.save_ai_history(&log.records()));
        Ok(BooleanResponse { success: true })
    }

    // ─── AI assistant ───────────────────────────────────────────────────────

    pub async fn ask_assistant(&self, payload: AskAssistantPayload) -> AppResult<AiQueryItem> {
        let api_key = self.gemini_api_key().await?;
        let response = self
            .gemini
            .emergency_guidance(&api_key, &payload.prompt, payload.audio.as_ref())
            .await?;

        let query = if payload.prompt.trim().is_empty() {
            "Solicitação via áudio".to_string()
        } else {
            payload.prompt
        };
        let item = AiQueryItem {
            id: Uuid::new_v4().to_string(),
            query,
            response,
            timestamp: Utc::now().timestamp_millis(),
        };

        let mut log = Self::lock(&self.history, "AI session log")?;
        log.append(item.clone());
        self.persist("ai_history", self.db.save_ai_history(&log.records()));
        Ok(item)
    }

    pub async fn edit_image(&self, payload: EditImagePayload) -> AppResult<EditedImageResponse> {
        let api_key = self.gemini_api_key().await?;
        let image = parse_data_url(&payload.image_data_url)?;
        let edited = self
            .gemini
            .edit_image(&api_key, &image, &payload.prompt)
            .await?;
        Ok(EditedImageResponse {
            image_data_url: edited.map(|image| image.to_data_url()),
        })
    }

    // ─── Accessibility settings ─────────────────────────────────────────────

    pub fn get_accessibility_settings(&self) -> AppResult<AccessibilitySettings> {
        Ok(Self::lock(&self.settings, "accessibility settings")?.clone())
    }

    /// Full-record replacement; there are no partial updates.
    pub fn update_accessibility_settings(
        &self,
        settings: AccessibilitySettings,
    ) -> AppResult<AccessibilitySettings> {
        let mut current = Self::lock(&self.settings, "accessibility settings")?;
        *current = settings.clone();
        self.persist("accessibility", self.db.save_accessibility(&current));
        Ok(settings)
    }

    pub fn trigger_haptics(&self, intensity: HapticIntensity) -> AppResult<()> {
        let enabled = Self::lock(&self.settings, "accessibility settings")?.haptic_feedback;
        if enabled {
            self.dispatcher.vibrate(intensity);
        }
        Ok(())
    }

    // ─── Emergency actions ──────────────────────────────────────────────────

    pub async fn emergency_tap(&self) {
        self.taps.tap().await;
    }

    pub fn place_call(&self, number: Option<String>) {
        let number = number.unwrap_or_else(|| EMERGENCY_NUMBER.to_string());
        self.dispatcher.place_call(&number);
    }

    pub fn send_silent_alert(&self, contact_id: &str) -> AppResult<BooleanResponse> {
        let contact = {
            let directory = Self::lock(&self.contacts, "contact directory")?;
            directory
                .records()
                .iter()
                .find(|contact| contact.id == contact_id)
                .cloned()
        };
        let Some(contact) = contact else {
            return Err(AppError::NotFound(format!(
                "No contact with id {contact_id}"
            )));
        };
        self.dispatcher.send_silent_alert(&contact);
        Ok(BooleanResponse { success: true })
    }

    // ─── API key management ─────────────────────────────────────────────────

    async fn gemini_api_key(&self) -> AppResult<String> {
        let _guard = self.keyring_lock.lock().await;
        let entry = keyring::Entry::new(KEYRING_SERVICE, GEMINI_KEY_USER)
            .map_err(|error| AppError::Io(error.to_string()))?;
        match entry.get_password() {
            Ok(key) if !key.is_empty() => Ok(key),
            Ok(_) | Err(keyring::Error::NoEntry) => Err(AppError::External(
                "No AI service API key is configured".to_string(),
            )),
            Err(error) => Err(AppError::Io(error.to_string())),
        }
    }

    pub async fn save_gemini_api_key(&self, key: String) -> AppResult<BooleanResponse> {
        let _guard = self.keyring_lock.lock().await;
        let entry = keyring::Entry::new(KEYRING_SERVICE, GEMINI_KEY_USER)
            .map_err(|error| AppError::Io(error.to_string()))?;
        entry
            .set_password(&key)
            .map_err(|error| AppError::Io(error.to_string()))?;
        Ok(BooleanResponse { success: true })
    }

    pub async fn clear_gemini_api_key(&self) -> AppResult<BooleanResponse> {
        let _guard = self.keyring_lock.lock().await;
        let entry = keyring::Entry::new(KEYRING_SERVICE, GEMINI_KEY_USER)
            .map_err(|error| AppError::Io(error.to_string()))?;
        match entry.delete_credential() {
            Ok(_) => Ok(BooleanResponse { success: true }),
            Err(keyring::Error::NoEntry) => Ok(BooleanResponse { success: true }),
            Err(error) => Err(AppError::Io(error.to_string())),
        }
    }

    pub async fn has_gemini_api_key(&self) -> AppResult<BooleanResponse> {
        let _guard = self.keyring_lock.lock().await;
        let entry = keyring::Entry::new(KEYRING_SERVICE, GEMINI_KEY_USER)
            .map_err(|error| AppError::Io(error.to_string()))?;
        match entry.get_password() {
            Ok(value) => Ok(BooleanResponse {
                success: !value.is_empty(),
            }),
            Err(keyring::Error::NoEntry) => Ok(BooleanResponse { success: false }),
            Err(error) => Err(AppError::Io(error.to_string())),
        }
    }

    // ─── Onboarding ─────────────────────────────────────────────────────────

    pub fn is_onboarded(&self) -> AppResult<bool> {
        self.db.load_onboarded()
    }

    pub fn complete_onboarding(&self) -> AppResult<BooleanResponse> {
        self.db.save_onboarded(true)?;
        Ok(BooleanResponse { success: true })
    }
}
