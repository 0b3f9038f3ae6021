use super::{confirm, status_class, view_error, view_loading};
use crate::api::{ApiClient, ApiError};
use crate::route::Route;
use diary_client::models::Diary;
use diary_client::session::SessionSlot;
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;
use yew_router::prelude::*;

pub enum Msg {
    Loaded(Vec<Diary>),
    Delete(String),
    Deleted(String),
    Failed(ApiError),
}

/// The current user's diaries in every status.
pub struct MyDiaries {
    diaries: Vec<Diary>,
    loading: bool,
    /// Diary whose delete request is in flight.
    deleting: Option<String>,
    error: Option<String>,
    api: ApiClient,
}

/// Claims the single delete slot for `id`, false while another is pending.
fn begin_delete(deleting: &mut Option<String>, id: &str) -> bool {
    if deleting.is_some() {
        return false;
    }
    *deleting = Some(id.to_string());
    true
}

impl Component for MyDiaries {
    type Message = Msg;
    type Properties = ();

    fn create(ctx: &Context<Self>) -> Self {
        let api = ApiClient::user();
        let fetcher = api.clone();
        let link = ctx.link().clone();
        spawn_local(async move {
            match fetcher.my_diaries().await {
                Ok(diaries) => link.send_message(Msg::Loaded(diaries)),
                Err(e) => link.send_message(Msg::Failed(e)),
            }
        });

        Self {
            diaries: Vec::new(),
            loading: true,
            deleting: None,
            error: None,
            api,
        }
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            Msg::Loaded(diaries) => {
                self.diaries = diaries;
                self.loading = false;
            }

            Msg::Delete(id) => {
                if self.deleting.is_some()
                    || !confirm("Delete this diary? This cannot be undone.")
                    || !begin_delete(&mut self.deleting, &id)
                {
                    return false;
                }
                self.error = None;
                let api = self.api.clone();
                let link = ctx.link().clone();
                spawn_local(async move {
                    match api.delete_diary(&id).await {
                        Ok(()) => link.send_message(Msg::Deleted(id)),
                        Err(e) => link.send_message(Msg::Failed(e)),
                    }
                });
            }

            Msg::Deleted(id) => {
                self.deleting = None;
                self.diaries.retain(|d| d.id != id);
                self.error = None;
            }

            Msg::Failed(e) => {
                self.loading = false;
                self.deleting = None;
                if e.is_session_expired() {
                    if let Some(navigator) = ctx.link().navigator() {
                        navigator.push(&Route::login_for(SessionSlot::User));
                    }
                    return false;
                }
                log::error!("My diaries: {}", e);
                self.error = Some(e.to_string());
            }
        }
        true
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        html! {
            <div class="container my-diaries-page">
                <h2>{ "My diaries" }</h2>
                { view_error(&self.error) }
                { view_loading(self.loading) }

                if !self.loading && self.diaries.is_empty() {
                    <p class="empty">
                        { "You have not published anything yet. " }
                        <Link<Route> to={Route::Publish}>{ "Write your first diary" }</Link<Route>>
                    </p>
                }

                <ul class="my-diaries">
                    { for self.diaries.iter().map(|d| self.view_row(ctx, d)) }
                </ul>
            </div>
        }
    }
}

impl MyDiaries {
    fn view_row(&self, ctx: &Context<Self>, diary: &Diary) -> Html {
        let id = diary.id.clone();
        let ondelete = ctx.link().callback(move |_| Msg::Delete(id.clone()));
        let pending = self.deleting.as_deref() == Some(diary.id.as_str());

        html! {
            <li key={diary.id.clone()}>
                <Link<Route> to={Route::Diary { id: diary.id.clone() }}>{ &diary.title }</Link<Route>>
                <span class={status_class(diary.status)}>{ diary.status.label() }</span>
                <small>{ diary.created_date() }</small>
                if let Some(reason) = &diary.reject_reason {
                    <p class="reject-reason">{ format!("Reason: {}", reason) }</p>
                }
                <div class="actions">
                    if diary.status.is_editable() {
                        <Link<Route> to={Route::Edit { id: diary.id.clone() }}>{ "Edit" }</Link<Route>>
                    }
                    <button class="danger" onclick={ondelete} disabled={self.deleting.is_some()}>
                        { if pending { "Deleting..." } else { "Delete" } }
                    </button>
                </div>
            </li>
        }
    }
}

#[cfg(test)]
mod tests {
    use super::begin_delete;

    #[test]
    fn second_delete_is_refused_while_first_is_pending() {
        let mut deleting = None;
        assert!(begin_delete(&mut deleting, "d1"));
        assert_eq!(deleting.as_deref(), Some("d1"));

        assert!(!begin_delete(&mut deleting, "d1"));
        assert!(!begin_delete(&mut deleting, "d2"));
        assert_eq!(deleting.as_deref(), Some("d1"));

        deleting = None;
        assert!(begin_delete(&mut deleting, "d2"));
    }
}
