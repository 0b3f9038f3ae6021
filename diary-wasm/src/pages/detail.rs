use super::{status_class, view_error, view_loading};
use crate::api::{ApiClient, ApiError};
use crate::route::Route;
use crate::storage;
use diary_client::carousel::Carousel;
use diary_client::models::{Diary, DiaryStatus};
use diary_client::moderation::can_edit;
use diary_client::session::SessionSlot;
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;
use yew_router::prelude::*;

pub enum Msg {
    Load,
    Loaded(Diary),
    Failed(ApiError),
    Previous,
    Next,
}

#[derive(Properties, PartialEq)]
pub struct Props {
    pub id: String,
}

pub struct DiaryDetail {
    diary: Option<Diary>,
    carousel: Carousel,
    loading: bool,
    error: Option<String>,
    api: ApiClient,
}

impl Component for DiaryDetail {
    type Message = Msg;
    type Properties = Props;

    fn create(ctx: &Context<Self>) -> Self {
        ctx.link().send_message(Msg::Load);
        Self {
            diary: None,
            carousel: Carousel::default(),
            loading: false,
            error: None,
            api: ApiClient::user(),
        }
    }

    fn changed(&mut self, ctx: &Context<Self>, old_props: &Self::Properties) -> bool {
        if ctx.props().id != old_props.id {
            ctx.link().send_message(Msg::Load);
        }
        true
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            Msg::Load => {
                self.loading = true;
                self.error = None;

                let id = ctx.props().id.clone();
                let api = self.api.clone();
                let link = ctx.link().clone();
                spawn_local(async move {
                    match api.get_diary(&id).await {
                        Ok(diary) => link.send_message(Msg::Loaded(diary)),
                        Err(e) => link.send_message(Msg::Failed(e)),
                    }
                });
            }

            Msg::Loaded(diary) => {
                self.carousel = Carousel::new(diary.images.len());
                self.diary = Some(diary);
                self.loading = false;
            }

            Msg::Failed(e) => {
                self.loading = false;
                self.error = Some(if e.is_not_found() {
                    "This diary does not exist or is not visible yet.".to_string()
                } else {
                    e.to_string()
                });
            }

            Msg::Previous => self.carousel.previous(),
            Msg::Next => self.carousel.next(),
        }
        true
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        html! {
            <div class="container diary-detail">
                { view_error(&self.error) }
                { view_loading(self.loading) }
                if let Some(diary) = &self.diary {
                    { self.view_diary(ctx, diary) }
                }
            </div>
        }
    }
}

impl DiaryDetail {
    fn view_diary(&self, ctx: &Context<Self>, diary: &Diary) -> Html {
        let viewer = storage::load_session(SessionSlot::User);
        let editable = can_edit(diary, viewer.as_ref().map(|s| s.user.id.as_str()));

        html! {
            <article>
                <h2>{ &diary.title }</h2>
                <div class="meta">
                    <span>{ diary.author_nickname() }</span>
                    <span>{ diary.created_date() }</span>
                    if diary.status != DiaryStatus::Approved {
                        <span class={status_class(diary.status)}>{ diary.status.label() }</span>
                    }
                </div>

                { self.view_carousel(ctx, diary) }

                if let Some(video) = diary.video_url.as_deref().filter(|v| !v.is_empty()) {
                    <video class="video" controls=true src={self.api.media_url(video)} />
                }

                <p class="content">{ &diary.content }</p>

                if let Some(reason) = &diary.reject_reason {
                    <p class="reject-reason">{ format!("Reject reason: {}", reason) }</p>
                }

                if editable {
                    <Link<Route> to={Route::Edit { id: diary.id.clone() }} classes="button">
                        { "Edit" }
                    </Link<Route>>
                }
            </article>
        }
    }

    fn view_carousel(&self, ctx: &Context<Self>, diary: &Diary) -> Html {
        let Some(index) = self.carousel.current() else {
            return html! { <div class="carousel empty">{ "No images" }</div> };
        };
        let src = self.api.media_url(&diary.images[index]);

        html! {
            <div class="carousel">
                <img src={src} alt={format!("{} image {}", diary.title, index + 1)} />
                if self.carousel.has_navigation() {
                    <button class="prev" onclick={ctx.link().callback(|_| Msg::Previous)}>{ "‹" }</button>
                    <button class="next" onclick={ctx.link().callback(|_| Msg::Next)}>{ "›" }</button>
                }
                if let Some(label) = self.carousel.position_label() {
                    <span class="position">{ label }</span>
                }
            </div>
        }
    }
}
