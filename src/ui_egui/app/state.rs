use crate::models::settings::AppConfig;
use crate::models::user::{Role, User};
use crate::ui_egui::views::auth::{AuthForm, AuthPage};
use crate::ui_egui::views::dashboard::DashboardView;
use crate::ui_egui::views::patients::PatientsView;
use crate::ui_egui::views::profile::ProfileView;
use crate::ui_egui::views::schedule::ScheduleView;
use crate::ui_egui::views::users::UsersView;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Login,
    ForgotPassword,
    ResetPassword,
    VerifyEmail,
    Dashboard,
    Schedule,
    Patients,
    Users,
    Profile,
}

impl Screen {
    /// Entries shown in the sidebar, in order
    pub const NAVIGATION: [Screen; 5] = [
        Screen::Dashboard,
        Screen::Schedule,
        Screen::Patients,
        Screen::Users,
        Screen::Profile,
    ];

    pub fn auth_page(self) -> Option<AuthPage> {
        match self {
            Screen::Login => Some(AuthPage::Login),
            Screen::ForgotPassword => Some(AuthPage::ForgotPassword),
            Screen::ResetPassword => Some(AuthPage::ResetPassword),
            Screen::VerifyEmail => Some(AuthPage::VerifyEmail),
            _ => None,
        }
    }

    pub fn from_auth_page(page: AuthPage) -> Self {
        match page {
            AuthPage::Login => Screen::Login,
            AuthPage::ForgotPassword => Screen::ForgotPassword,
            AuthPage::ResetPassword => Screen::ResetPassword,
            AuthPage::VerifyEmail => Screen::VerifyEmail,
        }
    }

    pub fn requires_auth(self) -> bool {
        self.auth_page().is_none()
    }

    pub fn title(self) -> &'static str {
        match self {
            Screen::Login => "Iniciar sesión",
            Screen::ForgotPassword => "Recuperar contraseña",
            Screen::ResetPassword => "Restablecer contraseña",
            Screen::VerifyEmail => "Verificar email",
            Screen::Dashboard => "Dashboard",
            Screen::Schedule => "Programación",
            Screen::Patients => "Pacientes",
            Screen::Users => "Usuarios",
            Screen::Profile => "Mi perfil",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            Screen::Dashboard => "📊",
            Screen::Schedule => "🗓",
            Screen::Patients => "🧑",
            Screen::Users => "👥",
            Screen::Profile => "⚙",
            _ => "",
        }
    }

    /// Whether `user` may open this screen
    pub fn allowed_for(self, user: Option<&User>) -> bool {
        match (self.requires_auth(), user) {
            (false, _) => true,
            (true, None) => false,
            (true, Some(user)) => self != Screen::Users || user.role == Role::Admin,
        }
    }
}

/// Per-screen view state
pub struct AppState {
    pub screen: Screen,
    pub auth_form: AuthForm,
    pub dashboard: DashboardView,
    pub schedule: ScheduleView,
    pub patients: PatientsView,
    pub users: UsersView,
    pub profile: ProfileView,
}

impl AppState {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            screen: Screen::Login,
            auth_form: AuthForm::default(),
            dashboard: DashboardView::default(),
            schedule: ScheduleView::new(&config.schedule),
            patients: PatientsView::default(),
            users: UsersView::default(),
            profile: ProfileView::default(),
        }
    }

    /// Drop everything fetched under the previous session
    pub fn reset_session_data(&mut self, config: &AppConfig) {
        let screen = self.screen;
        *self = Self::new(config);
        self.screen = screen;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn user(role: Role) -> User {
        User {
            id: "1".to_string(),
            email: "ana@bak.cl".to_string(),
            first_name: "Ana".to_string(),
            last_name: "Silva".to_string(),
            phone: None,
            role,
            is_active: true,
            email_verified: true,
            last_login: None,
            created_at: None,
            updated_at: None,
        }
    }

    #[test_case(Screen::Login, None, true ; "login open to everyone")]
    #[test_case(Screen::Dashboard, None, false ; "dashboard needs a session")]
    #[test_case(Screen::Schedule, Some(Role::Doctor), true ; "doctor can schedule")]
    #[test_case(Screen::Users, Some(Role::Doctor), false ; "users is admin only")]
    #[test_case(Screen::Users, Some(Role::Admin), true ; "admin manages users")]
    fn test_screen_access(screen: Screen, role: Option<Role>, expected: bool) {
        let user = role.map(user);
        assert_eq!(screen.allowed_for(user.as_ref()), expected);
    }

    #[test]
    fn test_auth_pages_round_trip() {
        for page in [
            AuthPage::Login,
            AuthPage::ForgotPassword,
            AuthPage::ResetPassword,
            AuthPage::VerifyEmail,
        ] {
            assert_eq!(Screen::from_auth_page(page).auth_page(), Some(page));
        }
        assert!(Screen::NAVIGATION.iter().all(|screen| screen.requires_auth()));
    }

    #[test]
    fn test_reset_keeps_current_screen() {
        let config = AppConfig::default();
        let mut state = AppState::new(&config);
        state.screen = Screen::Login;
        state.patients.search = "rojas".to_string();

        state.reset_session_data(&config);
        assert_eq!(state.screen, Screen::Login);
        assert!(state.patients.search.is_empty());
    }
}
