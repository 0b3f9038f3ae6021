use super::{alert, confirm, status_class, view_error, view_loading};
use crate::api::{ApiClient, ApiError};
use crate::pages::auth::Login;
use crate::route::Route;
use crate::storage;
use diary_client::models::{Diary, DiaryStatus};
use diary_client::moderation::{ModerationAction, StatusFilter};
use diary_client::session::SessionSlot;
use wasm_bindgen_futures::spawn_local;
use web_sys::HtmlSelectElement;
use yew::prelude::*;
use yew_router::prelude::*;

#[function_component(AdminLogin)]
pub fn admin_login() -> Html {
    html! { <Login slot={SessionSlot::Admin} /> }
}

pub enum Msg {
    Refresh,
    SetFilter(StatusFilter),
    Loaded(Vec<Diary>),
    Act {
        id: String,
        status: DiaryStatus,
        action: ModerationAction,
    },
    Done(ModerationAction),
    Failed(ApiError),
}

/// Moderation table over `/api/admin/diaries`.
pub struct AdminDashboard {
    diaries: Vec<Diary>,
    filter: StatusFilter,
    loading: bool,
    busy: bool,
    error: Option<String>,
    api: ApiClient,
}

fn ask_reason() -> Option<String> {
    gloo_utils::window()
        .prompt_with_message("Reason for rejection:")
        .ok()
        .flatten()
}

impl AdminDashboard {
    fn fetch(&mut self, ctx: &Context<Self>) {
        self.loading = true;
        let api = self.api.clone();
        let filter = self.filter;
        let link = ctx.link().clone();
        spawn_local(async move {
            match api.admin_list_diaries(filter).await {
                Ok(diaries) => link.send_message(Msg::Loaded(diaries)),
                Err(e) => link.send_message(Msg::Failed(e)),
            }
        });
    }

    fn view_row(&self, ctx: &Context<Self>, diary: &Diary) -> Html {
        let actions = ModerationAction::available_for(diary.status);

        html! {
            <tr key={diary.id.clone()}>
                <td>
                    <Link<Route> to={Route::Diary { id: diary.id.clone() }}>{ &diary.title }</Link<Route>>
                </td>
                <td>{ diary.author_nickname() }</td>
                <td>{ diary.created_date() }</td>
                <td>
                    <span class={status_class(diary.status)}>{ diary.status.label() }</span>
                    if let Some(reason) = &diary.reject_reason {
                        <small class="reject-reason">{ reason }</small>
                    }
                </td>
                <td class="actions">
                    { for actions.iter().map(|&action| {
                        let id = diary.id.clone();
                        let status = diary.status;
                        let onclick = ctx.link().callback(move |_| Msg::Act {
                            id: id.clone(),
                            status,
                            action,
                        });
                        let class = if action == ModerationAction::Delete { "danger" } else { "" };
                        html! {
                            <button {class} {onclick} disabled={self.busy}>{ action.label() }</button>
                        }
                    }) }
                </td>
            </tr>
        }
    }
}

impl Component for AdminDashboard {
    type Message = Msg;
    type Properties = ();

    fn create(ctx: &Context<Self>) -> Self {
        ctx.link().send_message(Msg::Refresh);
        Self {
            diaries: Vec::new(),
            filter: StatusFilter::All,
            loading: false,
            busy: false,
            error: None,
            api: ApiClient::admin(),
        }
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            Msg::Refresh => {
                if storage::token(SessionSlot::Admin).is_none() {
                    if let Some(navigator) = ctx.link().navigator() {
                        navigator.push(&Route::AdminLogin);
                    }
                    return false;
                }
                self.fetch(ctx);
            }

            Msg::SetFilter(filter) => {
                if filter == self.filter {
                    return false;
                }
                self.filter = filter;
                self.fetch(ctx);
            }

            Msg::Loaded(diaries) => {
                self.diaries = diaries;
                self.loading = false;
                self.error = None;
            }

            Msg::Act { id, status, action } => {
                if self.busy || !confirm(action.confirmation_prompt()) {
                    return false;
                }

                let reason = match action {
                    ModerationAction::Reject => match ask_reason() {
                        Some(reason) => Some(reason),
                        None => return false,
                    },
                    _ => None,
                };

                let call = match action.prepare(status, reason.as_deref()) {
                    Ok(call) => call,
                    Err(e) => {
                        self.error = Some(e.to_string());
                        return true;
                    }
                };

                self.busy = true;
                self.error = None;

                let api = self.api.clone();
                let link = ctx.link().clone();
                spawn_local(async move {
                    match api.moderate(&id, &call).await {
                        Ok(()) => link.send_message(Msg::Done(action)),
                        Err(e) => link.send_message(Msg::Failed(e)),
                    }
                });
            }

            Msg::Done(action) => {
                self.busy = false;
                alert(action.success_message());
                self.fetch(ctx);
            }

            Msg::Failed(e) => {
                self.loading = false;
                self.busy = false;
                if e.is_session_expired() {
                    if let Some(navigator) = ctx.link().navigator() {
                        navigator.push(&Route::login_for(SessionSlot::Admin));
                    }
                    return false;
                }
                log::error!("Moderation: {}", e);
                self.error = Some(e.to_string());
            }
        }
        true
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let onchange = ctx.link().batch_callback(|e: Event| {
            let select: HtmlSelectElement = e.target_unchecked_into();
            select.value().parse::<StatusFilter>().ok().map(Msg::SetFilter)
        });

        html! {
            <div class="container admin-dashboard">
                <div class="toolbar">
                    <select {onchange}>
                        { for StatusFilter::OPTIONS.iter().map(|f| html! {
                            <option value={f.as_str()} selected={*f == self.filter}>{ f.label() }</option>
                        }) }
                    </select>
                    <button onclick={ctx.link().callback(|_| Msg::Refresh)} disabled={self.loading}>
                        { "Refresh" }
                    </button>
                </div>

                { view_error(&self.error) }
                { view_loading(self.loading) }

                if !self.loading && self.diaries.is_empty() {
                    <p class="empty">{ "No diaries match this filter." }</p>
                }

                <table class="moderation">
                    <thead>
                        <tr>
                            <th>{ "Title" }</th>
                            <th>{ "Author" }</th>
                            <th>{ "Created" }</th>
                            <th>{ "Status" }</th>
                            <th>{ "Actions" }</th>
                        </tr>
                    </thead>
                    <tbody>
                        { for self.diaries.iter().map(|d| self.view_row(ctx, d)) }
                    </tbody>
                </table>
            </div>
        }
    }
}
