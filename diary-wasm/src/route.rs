use crate::pages::{
    admin::{AdminDashboard, AdminLogin},
    auth::{Login, Register},
    detail::DiaryDetail,
    diaries::DiaryList,
    edit::EditDiary,
    my_diaries::MyDiaries,
    profile::Profile,
    publish::PublishDiary,
};
use diary_client::session::SessionSlot;
use yew::prelude::*;
use yew_router::prelude::*;

#[derive(Clone, Routable, PartialEq, Debug)]
pub enum Route {
    #[at("/")]
    Home,
    #[at("/m")]
    Plaza,
    #[at("/m/auth/login")]
    Login,
    #[at("/m/auth/register")]
    Register,
    #[at("/m/diaries")]
    Diaries,
    #[at("/m/diaries/publish")]
    Publish,
    #[at("/m/diaries/edit/:id")]
    Edit { id: String },
    #[at("/m/diaries/:id")]
    Diary { id: String },
    #[at("/m/my-diaries")]
    MyDiaries,
    #[at("/m/profile")]
    Profile,
    #[at("/admin/auth/login")]
    AdminLogin,
    #[at("/admin/dashboard")]
    AdminDashboard,
    #[not_found]
    #[at("/404")]
    NotFound,
}

impl Route {
    /// Where a rejected or missing session sends the user.
    pub fn login_for(slot: SessionSlot) -> Self {
        match slot {
            SessionSlot::User => Route::Login,
            SessionSlot::Admin => Route::AdminLogin,
        }
    }
}

pub fn switch(route: Route) -> Html {
    match route {
        Route::Home | Route::Plaza | Route::Diaries => html! { <DiaryList /> },
        Route::Login => html! { <Login /> },
        Route::Register => html! { <Register /> },
        Route::Publish => html! { <PublishDiary /> },
        Route::Edit { id } => html! { <EditDiary {id} /> },
        Route::Diary { id } => html! { <DiaryDetail {id} /> },
        Route::MyDiaries => html! { <MyDiaries /> },
        Route::Profile => html! { <Profile /> },
        Route::AdminLogin => html! { <AdminLogin /> },
        Route::AdminDashboard => html! { <AdminDashboard /> },
        Route::NotFound => html! {
            <div class="container">
                <h2>{ "Page not found" }</h2>
                <Link<Route> to={Route::Diaries}>{ "Back to the plaza" }</Link<Route>>
            </div>
        },
    }
}
