use super::{input_value, textarea_value, view_error, view_loading};
use crate::api::{ApiClient, ApiError};
use crate::route::Route;
use diary_client::models::{Diary, DiaryStatus, UpdateDiaryRequest};
use diary_client::session::SessionSlot;
use diary_client::validation;
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;
use yew_router::prelude::*;

pub enum Msg {
    Loaded(Diary),
    UpdateTitle(String),
    UpdateContent(String),
    UpdateVideo(String),
    Submit,
    Saved(Diary),
    Failed(ApiError),
}

#[derive(Properties, PartialEq)]
pub struct Props {
    pub id: String,
}

/// Edits the text of a pending or rejected diary. Media stays as uploaded.
pub struct EditDiary {
    title: String,
    content: String,
    video_url: String,
    status: Option<DiaryStatus>,
    loading: bool,
    saving: bool,
    error: Option<String>,
    api: ApiClient,
}

impl EditDiary {
    fn handle_error(&mut self, ctx: &Context<Self>, e: ApiError) {
        if e.is_session_expired() {
            if let Some(navigator) = ctx.link().navigator() {
                navigator.push(&Route::login_for(SessionSlot::User));
            }
            return;
        }
        self.error = Some(e.to_string());
    }
}

impl Component for EditDiary {
    type Message = Msg;
    type Properties = Props;

    fn create(ctx: &Context<Self>) -> Self {
        let api = ApiClient::user();
        let id = ctx.props().id.clone();
        let link = ctx.link().clone();
        let fetcher = api.clone();
        spawn_local(async move {
            match fetcher.get_diary(&id).await {
                Ok(diary) => link.send_message(Msg::Loaded(diary)),
                Err(e) => link.send_message(Msg::Failed(e)),
            }
        });

        Self {
            title: String::new(),
            content: String::new(),
            video_url: String::new(),
            status: None,
            loading: true,
            saving: false,
            error: None,
            api,
        }
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            Msg::Loaded(diary) => {
                self.loading = false;
                self.title = diary.title;
                self.content = diary.content;
                self.video_url = diary.video_url.unwrap_or_default();
                self.status = Some(diary.status);
                if !diary.status.is_editable() {
                    self.error = Some(validation::ValidationError::EditLocked.to_string());
                }
            }

            Msg::UpdateTitle(val) => self.title = val,
            Msg::UpdateContent(val) => self.content = val,
            Msg::UpdateVideo(val) => self.video_url = val,

            Msg::Submit => {
                let Some(status) = self.status else {
                    return false;
                };
                if self.saving {
                    return false;
                }
                let text = match validation::validate_edit(&self.title, &self.content, status) {
                    Ok(text) => text,
                    Err(e) => {
                        self.error = Some(e.to_string());
                        return true;
                    }
                };

                let video = self.video_url.trim();
                let req = UpdateDiaryRequest {
                    title: text.title,
                    content: text.content,
                    video_url: (!video.is_empty()).then(|| video.to_string()),
                };

                self.saving = true;
                self.error = None;

                let id = ctx.props().id.clone();
                let api = self.api.clone();
                let link = ctx.link().clone();
                spawn_local(async move {
                    match api.update_diary(&id, &req).await {
                        Ok(diary) => link.send_message(Msg::Saved(diary)),
                        Err(e) => link.send_message(Msg::Failed(e)),
                    }
                });
            }

            Msg::Saved(diary) => {
                log::info!("Updated diary {}", diary.id);
                self.saving = false;
                super::alert("Diary updated.");
                if let Some(navigator) = ctx.link().navigator() {
                    navigator.push(&Route::MyDiaries);
                }
            }

            Msg::Failed(e) => {
                self.loading = false;
                self.saving = false;
                self.handle_error(ctx, e);
            }
        }
        true
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let link = ctx.link();
        let locked = self.status.map_or(true, |s| !s.is_editable());
        let onsubmit = link.callback(|e: SubmitEvent| {
            e.prevent_default();
            Msg::Submit
        });

        html! {
            <div class="container edit-page">
                <h2>{ "Edit diary" }</h2>
                { view_error(&self.error) }
                { view_loading(self.loading) }

                if !self.loading && !locked {
                    <form class="diary-form" {onsubmit}>
                        <input
                            type="text"
                            value={self.title.clone()}
                            oninput={link.callback(|e| Msg::UpdateTitle(input_value(e)))}
                        />
                        <textarea
                            value={self.content.clone()}
                            oninput={link.callback(|e| Msg::UpdateContent(textarea_value(e)))}
                        />
                        <input
                            type="text"
                            placeholder="Video URL (leave blank to remove)"
                            value={self.video_url.clone()}
                            oninput={link.callback(|e| Msg::UpdateVideo(input_value(e)))}
                        />
                        <button type="submit" disabled={self.saving}>
                            { if self.saving { "Saving..." } else { "Save" } }
                        </button>
                    </form>
                }

                <Link<Route> to={Route::MyDiaries}>{ "Back to my diaries" }</Link<Route>>
            </div>
        }
    }
}
