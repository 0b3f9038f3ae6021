use super::{input_value, media_meta, picked_files, view_error, view_loading};
use crate::api::{ApiClient, ApiError};
use crate::route::Route;
use crate::storage;
use diary_client::models::{ProfilePatch, UserProfile};
use diary_client::session::SessionSlot;
use diary_client::validation;
use wasm_bindgen_futures::spawn_local;
use web_sys::{File, FormData};
use yew::prelude::*;
use yew_router::prelude::*;

pub enum Msg {
    Loaded(UserProfile),
    UpdateNickname(String),
    PickAvatar(Vec<File>),
    Submit,
    Applied(ProfilePatch),
    Saved,
    Failed(ApiError),
}

pub struct Profile {
    user: Option<UserProfile>,
    nickname: String,
    avatar: Option<File>,
    loading: bool,
    saving: bool,
    error: Option<String>,
    notice: Option<String>,
    api: ApiClient,
}

fn avatar_form(file: &File) -> Result<FormData, ApiError> {
    let form = FormData::new().map_err(|e| ApiError::Network(format!("{:?}", e)))?;
    form.append_with_blob_and_filename("avatar", file, &file.name())
        .map_err(|e| ApiError::Network(format!("{:?}", e)))?;
    Ok(form)
}

/// Writes an accepted change to the cached session and the page state.
fn apply_patch(link: &yew::html::Scope<Profile>, patch: ProfilePatch) {
    if let Err(e) = storage::sessions().update_user(SessionSlot::User, &patch) {
        log::error!("Failed to refresh cached user: {}", e);
    }
    link.send_message(Msg::Applied(patch));
}

impl Component for Profile {
    type Message = Msg;
    type Properties = ();

    fn create(ctx: &Context<Self>) -> Self {
        let api = ApiClient::user();
        let fetcher = api.clone();
        let link = ctx.link().clone();
        spawn_local(async move {
            match fetcher.current_user().await {
                Ok(user) => link.send_message(Msg::Loaded(user)),
                Err(e) => link.send_message(Msg::Failed(e)),
            }
        });

        Self {
            user: None,
            nickname: String::new(),
            avatar: None,
            loading: true,
            saving: false,
            error: None,
            notice: None,
            api,
        }
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            Msg::Loaded(user) => {
                self.nickname = user.nickname.clone();
                self.user = Some(user);
                self.loading = false;
            }

            Msg::UpdateNickname(val) => self.nickname = val,

            Msg::PickAvatar(files) => {
                let Some(file) = files.into_iter().next() else {
                    return false;
                };
                match validation::validate_avatar(&media_meta(&file)) {
                    Ok(()) => {
                        self.error = None;
                        self.avatar = Some(file);
                    }
                    Err(e) => {
                        self.avatar = None;
                        self.error = Some(e.to_string());
                    }
                }
            }

            Msg::Submit => {
                let Some(user) = &self.user else {
                    return false;
                };
                if self.saving {
                    return false;
                }
                self.notice = None;

                let nickname = self.nickname.trim();
                let new_nickname = (!nickname.is_empty() && nickname != user.nickname)
                    .then(|| nickname.to_string());

                if let Some(avatar) = &self.avatar {
                    if let Err(e) = validation::validate_avatar(&media_meta(avatar)) {
                        self.error = Some(e.to_string());
                        return true;
                    }
                }

                if new_nickname.is_none() && self.avatar.is_none() {
                    self.notice = Some("No changes to save.".to_string());
                    return true;
                }

                let form = match self.avatar.as_ref().map(avatar_form).transpose() {
                    Ok(form) => form,
                    Err(e) => {
                        self.error = Some(e.to_string());
                        return true;
                    }
                };

                self.saving = true;
                self.error = None;

                let api = self.api.clone();
                let link = ctx.link().clone();
                spawn_local(async move {
                    // each accepted step is cached before the next call
                    if let Some(nickname) = new_nickname {
                        match api.update_nickname(nickname.clone()).await {
                            Ok(updated) => apply_patch(
                                &link,
                                ProfilePatch {
                                    nickname: Some(updated.nickname.unwrap_or(nickname)),
                                    avatar_url: None,
                                },
                            ),
                            Err(e) => return link.send_message(Msg::Failed(e)),
                        }
                    }
                    if let Some(form) = form {
                        match api.upload_avatar(form).await {
                            Ok(uploaded) => apply_patch(
                                &link,
                                ProfilePatch {
                                    nickname: None,
                                    avatar_url: Some(uploaded.avatar_url),
                                },
                            ),
                            Err(e) => return link.send_message(Msg::Failed(e)),
                        }
                    }

                    link.send_message(Msg::Saved);
                });
            }

            Msg::Applied(patch) => {
                if let Some(user) = &mut self.user {
                    if let Some(nickname) = &patch.nickname {
                        user.nickname = nickname.clone();
                        self.nickname = nickname.clone();
                    }
                    if let Some(avatar_url) = &patch.avatar_url {
                        user.avatar_url = Some(avatar_url.clone());
                        self.avatar = None;
                    }
                }
            }

            Msg::Saved => {
                self.saving = false;
                self.notice = Some("Profile updated.".to_string());
            }

            Msg::Failed(e) => {
                self.loading = false;
                self.saving = false;
                if e.is_session_expired() {
                    if let Some(navigator) = ctx.link().navigator() {
                        navigator.push(&Route::login_for(SessionSlot::User));
                    }
                    return false;
                }
                self.error = Some(e.to_string());
            }
        }
        true
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let link = ctx.link();
        let onsubmit = link.callback(|e: SubmitEvent| {
            e.prevent_default();
            Msg::Submit
        });

        html! {
            <div class="container profile-page">
                <h2>{ "Profile" }</h2>
                { view_error(&self.error) }
                { view_loading(self.loading) }
                if let Some(notice) = &self.notice {
                    <div class="notice">{ notice }</div>
                }

                if let Some(user) = &self.user {
                    <div class="profile">
                        if let Some(avatar) = user.avatar_url.as_deref().filter(|a| !a.is_empty()) {
                            <img class="avatar" src={self.api.media_url(avatar)} alt="avatar" />
                        }
                        <p>{ format!("Username: {}", user.username) }</p>
                    </div>

                    <form class="profile-form" {onsubmit}>
                        <input
                            type="text"
                            placeholder="Nickname"
                            value={self.nickname.clone()}
                            oninput={link.callback(|e| Msg::UpdateNickname(input_value(e)))}
                        />
                        <label>
                            { format!("Avatar (up to {}MB)", validation::MAX_AVATAR_MB) }
                            <input
                                type="file"
                                accept="image/*"
                                onchange={link.callback(|e| Msg::PickAvatar(picked_files(e)))}
                            />
                        </label>
                        if let Some(avatar) = &self.avatar {
                            <small>{ avatar.name() }</small>
                        }
                        <button type="submit" disabled={self.saving}>
                            { if self.saving { "Saving..." } else { "Save" } }
                        </button>
                    </form>
                }
            </div>
        }
    }
}
