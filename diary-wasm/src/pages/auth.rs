use super::{input_value, view_error};
use crate::api::{ApiClient, ApiError};
use crate::route::Route;
use crate::storage;
use diary_client::models::{LoginRequest, LoginResponse, MessageResponse, RegisterRequest};
use diary_client::session::{Session, SessionSlot};
use diary_client::validation::{self, RegistrationForm};
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;
use yew_router::prelude::*;

// ==================== Вход ====================

pub enum LoginMsg {
    UpdateUsername(String),
    UpdatePassword(String),
    Submit,
    Success(LoginResponse),
    Failed(ApiError),
}

#[derive(Properties, PartialEq)]
pub struct LoginProps {
    #[prop_or(SessionSlot::User)]
    pub slot: SessionSlot,
}

/// Login form for either session slot.
pub struct Login {
    username: String,
    password: String,
    loading: bool,
    error: Option<String>,
    api: ApiClient,
}

impl Component for Login {
    type Message = LoginMsg;
    type Properties = LoginProps;

    fn create(ctx: &Context<Self>) -> Self {
        let api = match ctx.props().slot {
            SessionSlot::User => ApiClient::user(),
            SessionSlot::Admin => ApiClient::admin(),
        };

        Self {
            username: String::new(),
            password: String::new(),
            loading: false,
            error: None,
            api,
        }
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            LoginMsg::UpdateUsername(val) => {
                self.username = val;
                true
            }
            LoginMsg::UpdatePassword(val) => {
                self.password = val;
                true
            }

            LoginMsg::Submit => {
                if self.loading {
                    return false;
                }
                if let Err(e) = validation::validate_login(&self.username, &self.password) {
                    self.error = Some(e.to_string());
                    return true;
                }

                self.loading = true;
                self.error = None;

                let req = LoginRequest {
                    username: self.username.trim().to_string(),
                    password: self.password.clone(),
                };
                let api = self.api.clone();
                let link = ctx.link().clone();

                spawn_local(async move {
                    match api.login(&req).await {
                        Ok(response) => link.send_message(LoginMsg::Success(response)),
                        Err(e) => link.send_message(LoginMsg::Failed(e)),
                    }
                });

                true
            }

            LoginMsg::Success(response) => {
                let slot = self.api.slot();
                storage::save_session(slot, &Session::from_login(response));
                self.loading = false;
                self.password.clear();

                if let Some(navigator) = ctx.link().navigator() {
                    match slot {
                        SessionSlot::User => navigator.push(&Route::Diaries),
                        SessionSlot::Admin => navigator.push(&Route::AdminDashboard),
                    }
                }
                true
            }

            LoginMsg::Failed(e) => {
                log::warn!("Login failed: {}", e);
                self.error = Some(e.to_string());
                self.loading = false;
                true
            }
        }
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let is_admin = ctx.props().slot == SessionSlot::Admin;
        let onsubmit = ctx.link().callback(|e: SubmitEvent| {
            e.prevent_default();
            LoginMsg::Submit
        });

        html! {
            <div class="container auth-page">
                <h2>{ if is_admin { "Administrator login" } else { "Log in" } }</h2>
                { view_error(&self.error) }

                <form class="login-form" {onsubmit}>
                    <input
                        type="text"
                        placeholder="Username"
                        value={self.username.clone()}
                        oninput={ctx.link().callback(|e| LoginMsg::UpdateUsername(input_value(e)))}
                    />
                    <input
                        type="password"
                        placeholder="Password"
                        value={self.password.clone()}
                        oninput={ctx.link().callback(|e| LoginMsg::UpdatePassword(input_value(e)))}
                    />
                    <button type="submit" disabled={self.loading}>
                        { if self.loading { "Logging in..." } else { "Log in" } }
                    </button>
                </form>

                if !is_admin {
                    <p class="hint">
                        { "No account yet? " }
                        <Link<Route> to={Route::Register}>{ "Register" }</Link<Route>>
                    </p>
                }
            </div>
        }
    }
}

// ==================== Регистрация ====================

pub enum RegisterMsg {
    UpdateUsername(String),
    UpdateNickname(String),
    UpdatePassword(String),
    UpdateConfirm(String),
    Submit,
    Success(MessageResponse),
    Failed(ApiError),
}

pub struct Register {
    form: RegistrationForm,
    loading: bool,
    error: Option<String>,
    api: ApiClient,
}

impl Component for Register {
    type Message = RegisterMsg;
    type Properties = ();

    fn create(_ctx: &Context<Self>) -> Self {
        Self {
            form: RegistrationForm::default(),
            loading: false,
            error: None,
            api: ApiClient::user(),
        }
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            RegisterMsg::UpdateUsername(val) => self.form.username = val,
            RegisterMsg::UpdateNickname(val) => self.form.nickname = val,
            RegisterMsg::UpdatePassword(val) => self.form.password = val,
            RegisterMsg::UpdateConfirm(val) => self.form.confirm_password = val,

            RegisterMsg::Submit => {
                if self.loading {
                    return false;
                }
                if let Err(e) = validation::validate_registration(&self.form) {
                    self.error = Some(e.to_string());
                    return true;
                }

                self.loading = true;
                self.error = None;

                let req = RegisterRequest {
                    username: self.form.username.trim().to_string(),
                    nickname: self.form.nickname.trim().to_string(),
                    password: self.form.password.clone(),
                };
                let api = self.api.clone();
                let link = ctx.link().clone();

                spawn_local(async move {
                    match api.register(&req).await {
                        Ok(response) => link.send_message(RegisterMsg::Success(response)),
                        Err(e) => link.send_message(RegisterMsg::Failed(e)),
                    }
                });
            }

            RegisterMsg::Success(response) => {
                self.loading = false;
                super::alert(
                    response
                        .message
                        .as_deref()
                        .unwrap_or("Registration successful, please log in"),
                );
                if let Some(navigator) = ctx.link().navigator() {
                    navigator.push(&Route::Login);
                }
            }

            RegisterMsg::Failed(e) => {
                self.error = Some(e.to_string());
                self.loading = false;
            }
        }
        true
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let link = ctx.link();
        let onsubmit = link.callback(|e: SubmitEvent| {
            e.prevent_default();
            RegisterMsg::Submit
        });

        html! {
            <div class="container auth-page">
                <h2>{ "Create an account" }</h2>
                { view_error(&self.error) }

                <form class="register-form" {onsubmit}>
                    <input
                        type="text"
                        placeholder="Username"
                        value={self.form.username.clone()}
                        oninput={link.callback(|e| RegisterMsg::UpdateUsername(input_value(e)))}
                    />
                    <input
                        type="text"
                        placeholder="Nickname"
                        value={self.form.nickname.clone()}
                        oninput={link.callback(|e| RegisterMsg::UpdateNickname(input_value(e)))}
                    />
                    <input
                        type="password"
                        placeholder="Password (at least 6 characters)"
                        value={self.form.password.clone()}
                        oninput={link.callback(|e| RegisterMsg::UpdatePassword(input_value(e)))}
                    />
                    <input
                        type="password"
                        placeholder="Confirm password"
                        value={self.form.confirm_password.clone()}
                        oninput={link.callback(|e| RegisterMsg::UpdateConfirm(input_value(e)))}
                    />
                    <button type="submit" disabled={self.loading}>
                        { if self.loading { "Registering..." } else { "Register" } }
                    </button>
                </form>

                <p class="hint">
                    { "Already registered? " }
                    <Link<Route> to={Route::Login}>{ "Log in" }</Link<Route>>
                </p>
            </div>
        }
    }
}
