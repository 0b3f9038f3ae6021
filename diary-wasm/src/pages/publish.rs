use super::{input_value, media_meta, picked_files, textarea_value, view_error};
use crate::api::{ApiClient, ApiError};
use crate::route::Route;
use crate::storage;
use diary_client::models::Diary;
use diary_client::session::SessionSlot;
use diary_client::validation::{self, DiaryText, MAX_IMAGES, MAX_TITLE_CHARS};
use wasm_bindgen::JsValue;
use wasm_bindgen_futures::spawn_local;
use web_sys::{File, FormData, Url};
use yew::prelude::*;
use yew_router::prelude::*;

pub enum Msg {
    UpdateTitle(String),
    UpdateContent(String),
    PickImages(Vec<File>),
    RemoveImage(usize),
    PickVideo(Vec<File>),
    RemoveVideo,
    Submit,
    Published(Diary),
    Failed(ApiError),
}

/// Picked file plus the object URL used for its preview.
struct Picked {
    file: File,
    preview: String,
}

impl Picked {
    fn new(file: File) -> Self {
        let preview = Url::create_object_url_with_blob(&file).unwrap_or_default();
        Self { file, preview }
    }

    fn release(&self) {
        if !self.preview.is_empty() {
            let _ = Url::revoke_object_url(&self.preview);
        }
    }
}

pub struct PublishDiary {
    title: String,
    content: String,
    images: Vec<Picked>,
    video: Option<Picked>,
    loading: bool,
    error: Option<String>,
    api: ApiClient,
}

fn build_form(text: &DiaryText, images: &[Picked], video: Option<&Picked>) -> Result<FormData, JsValue> {
    let form = FormData::new()?;
    form.append_with_str("title", &text.title)?;
    form.append_with_str("content", &text.content)?;
    for image in images {
        form.append_with_blob_and_filename("images", &image.file, &image.file.name())?;
    }
    if let Some(video) = video {
        form.append_with_blob_and_filename("video", &video.file, &video.file.name())?;
    }
    Ok(form)
}

impl PublishDiary {
    fn go_to_login(ctx: &Context<Self>) {
        if let Some(navigator) = ctx.link().navigator() {
            navigator.push(&Route::login_for(SessionSlot::User));
        }
    }
}

impl Component for PublishDiary {
    type Message = Msg;
    type Properties = ();

    fn create(ctx: &Context<Self>) -> Self {
        if storage::token(SessionSlot::User).is_none() {
            Self::go_to_login(ctx);
        }

        Self {
            title: String::new(),
            content: String::new(),
            images: Vec::new(),
            video: None,
            loading: false,
            error: None,
            api: ApiClient::user(),
        }
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            Msg::UpdateTitle(val) => self.title = val,
            Msg::UpdateContent(val) => self.content = val,

            Msg::PickImages(files) => {
                if files.is_empty() {
                    return false;
                }
                let metas: Vec<_> = self
                    .images
                    .iter()
                    .map(|p| &p.file)
                    .chain(files.iter())
                    .map(media_meta)
                    .collect();

                match validation::validate_images(&metas) {
                    Ok(()) => {
                        self.error = None;
                        self.images.extend(files.into_iter().map(Picked::new));
                    }
                    Err(e) => self.error = Some(e.to_string()),
                }
            }

            Msg::RemoveImage(index) => {
                if index < self.images.len() {
                    self.images.remove(index).release();
                }
            }

            Msg::PickVideo(files) => {
                let Some(file) = files.into_iter().next() else {
                    return false;
                };
                match validation::validate_video(&media_meta(&file)) {
                    Ok(()) => {
                        self.error = None;
                        if let Some(old) = self.video.replace(Picked::new(file)) {
                            old.release();
                        }
                    }
                    Err(e) => self.error = Some(e.to_string()),
                }
            }

            Msg::RemoveVideo => {
                if let Some(old) = self.video.take() {
                    old.release();
                }
            }

            Msg::Submit => {
                if self.loading {
                    return false;
                }
                if storage::token(SessionSlot::User).is_none() {
                    Self::go_to_login(ctx);
                    return false;
                }

                let metas: Vec<_> = self.images.iter().map(|p| media_meta(&p.file)).collect();
                let video_meta = self.video.as_ref().map(|v| media_meta(&v.file));
                let text = match validation::validate_publish(
                    &self.title,
                    &self.content,
                    &metas,
                    video_meta.as_ref(),
                ) {
                    Ok(text) => text,
                    Err(e) => {
                        self.error = Some(e.to_string());
                        return true;
                    }
                };

                let form = match build_form(&text, &self.images, self.video.as_ref()) {
                    Ok(form) => form,
                    Err(e) => {
                        log::error!("Failed to build upload form: {:?}", e);
                        self.error = Some("Failed to prepare the upload".to_string());
                        return true;
                    }
                };

                self.loading = true;
                self.error = None;

                let api = self.api.clone();
                let link = ctx.link().clone();
                spawn_local(async move {
                    match api.publish_diary(form).await {
                        Ok(diary) => link.send_message(Msg::Published(diary)),
                        Err(e) => link.send_message(Msg::Failed(e)),
                    }
                });
            }

            Msg::Published(diary) => {
                log::info!("Published diary {}", diary.id);
                self.loading = false;
                super::alert("Diary published, it will be visible after review.");
                if let Some(navigator) = ctx.link().navigator() {
                    navigator.push(&Route::MyDiaries);
                }
            }

            Msg::Failed(e) => {
                self.loading = false;
                if e.is_session_expired() {
                    Self::go_to_login(ctx);
                    return false;
                }
                self.error = Some(e.to_string());
            }
        }
        true
    }

    fn destroy(&mut self, _ctx: &Context<Self>) {
        self.images.iter().for_each(Picked::release);
        if let Some(video) = &self.video {
            video.release();
        }
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let link = ctx.link();
        let onsubmit = link.callback(|e: SubmitEvent| {
            e.prevent_default();
            Msg::Submit
        });

        html! {
            <div class="container publish-page">
                <h2>{ "New travel diary" }</h2>
                { view_error(&self.error) }

                <form class="diary-form" {onsubmit}>
                    <input
                        type="text"
                        placeholder={format!("Title (up to {} characters)", MAX_TITLE_CHARS)}
                        value={self.title.clone()}
                        oninput={link.callback(|e| Msg::UpdateTitle(input_value(e)))}
                    />
                    <textarea
                        placeholder="Tell us about your trip"
                        value={self.content.clone()}
                        oninput={link.callback(|e| Msg::UpdateContent(textarea_value(e)))}
                    />

                    <label>{ format!("Images ({}/{})", self.images.len(), MAX_IMAGES) }</label>
                    <div class="previews">
                        { for self.images.iter().enumerate().map(|(i, image)| html! {
                            <div class="preview" key={image.preview.clone()}>
                                <img src={image.preview.clone()} alt={image.file.name()} />
                                <button type="button" onclick={link.callback(move |_| Msg::RemoveImage(i))}>
                                    { "×" }
                                </button>
                            </div>
                        }) }
                    </div>
                    if self.images.len() < MAX_IMAGES {
                        <input
                            type="file"
                            accept="image/*"
                            multiple=true
                            onchange={link.callback(|e| Msg::PickImages(picked_files(e)))}
                        />
                    }

                    <label>{ "Video (optional)" }</label>
                    if let Some(video) = &self.video {
                        <div class="preview video">
                            <video src={video.preview.clone()} controls=true />
                            <button type="button" onclick={link.callback(|_| Msg::RemoveVideo)}>{ "×" }</button>
                        </div>
                    } else {
                        <input
                            type="file"
                            accept="video/*"
                            onchange={link.callback(|e| Msg::PickVideo(picked_files(e)))}
                        />
                    }

                    <button type="submit" disabled={self.loading}>
                        { if self.loading { "Publishing..." } else { "Publish" } }
                    </button>
                </form>
            </div>
        }
    }
}
