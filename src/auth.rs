use crate::store::{LocalStore, SESSION_KEY, USERNAME_KEY};

// Fixed demo credentials; this client has no real authentication design.
const LOGIN_USERNAME: &str = "admin";
const LOGIN_PASSWORD: &str = "admin123";

const DEFAULT_DISPLAY_NAME: &str = "User";

pub fn login<S: LocalStore>(store: &S, username: &str, password: &str) -> bool {
    if username == LOGIN_USERNAME && password == LOGIN_PASSWORD {
        store.set(SESSION_KEY, "true");
        store.set(USERNAME_KEY, username);
        true
    } else {
        false
    }
}

pub fn logout<S: LocalStore>(store: &S) {
    store.remove(SESSION_KEY);
    store.remove(USERNAME_KEY);
}

pub fn is_authenticated<S: LocalStore>(store: &S) -> bool {
    store.get(SESSION_KEY).as_deref() == Some("true")
}

pub fn username<S: LocalStore>(store: &S) -> String {
    store
        .get(USERNAME_KEY)
        .unwrap_or_else(|| DEFAULT_DISPLAY_NAME.to_string())
}
