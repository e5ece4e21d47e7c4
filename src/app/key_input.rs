use crate::app::App;
use crate::services::key_selection::KeyRequest;

impl App {
    /// Shows the key dialog. `request` is set when a generation is waiting on it.
    pub fn open_key_dialog(&mut self, request: Option<KeyRequest>) {
        if let Some(previous) = self.pending_key_request.take() {
            let _ = previous.responder.send(None);
        }
        self.pending_key_request = request;
        self.key_dialog_open = true;
        self.key_input.clear();
    }

    pub fn close_key_dialog(&mut self) {
        if let Some(request) = self.pending_key_request.take() {
            let _ = request.responder.send(None);
        }
        self.key_dialog_open = false;
        self.key_input.clear();
    }

    pub fn submit_key_dialog(&mut self) {
        let key = self.key_input.content().trim().to_string();
        if key.is_empty() {
            self.show_status_toast("KEY EMPTY");
            return;
        }

        self.credential.set(key.clone());
        self.config.gemini.api_key = key.clone();
        let persisted = match &self.config_path {
            Some(path) => match self.config.save_to(path) {
                Ok(()) => true,
                Err(error) => {
                    tracing::error!(error = %error, "could not persist api key");
                    false
                }
            },
            None => false,
        };

        if let Some(request) = self.pending_key_request.take() {
            let _ = request.responder.send(Some(key));
        }
        self.key_dialog_open = false;
        self.key_input.clear();
        self.show_status_toast(if persisted { "KEY SAVED" } else { "KEY SET" });
    }

    pub fn add_key_char(&mut self, character: char) {
        self.key_input.add_char(character);
    }

    pub fn remove_key_char(&mut self) {
        self.key_input.remove_char();
    }
}
