use crate::route::{switch, Route};
use crate::storage;
use diary_client::session::SessionSlot;
use yew::prelude::*;
use yew_router::prelude::*;

pub struct App;

impl Component for App {
    type Message = ();
    type Properties = ();

    fn create(_ctx: &Context<Self>) -> Self {
        Self
    }

    fn view(&self, _ctx: &Context<Self>) -> Html {
        html! {
            <BrowserRouter>
                <NavBar />
                <main>
                    <Switch<Route> render={switch} />
                </main>
            </BrowserRouter>
        }
    }
}

/// Top bar. Subscribes to the route so login/logout are reflected after
/// every navigation.
#[function_component(NavBar)]
fn nav_bar() -> Html {
    let route = use_route::<Route>();
    let navigator = use_navigator();
    let refresh = use_force_update();

    if matches!(route, Some(Route::AdminLogin) | Some(Route::AdminDashboard)) {
        let admin = storage::load_session(SessionSlot::Admin);
        let onlogout = {
            let navigator = navigator.clone();
            Callback::from(move |_: MouseEvent| {
                storage::clear_session(SessionSlot::Admin);
                if let Some(navigator) = &navigator {
                    navigator.push(&Route::AdminLogin);
                }
            })
        };

        return html! {
            <nav class="navbar admin">
                <span class="brand">{ "Diary moderation" }</span>
                if let Some(admin) = admin {
                    <span class="user">{ admin.user.display_name().to_string() }</span>
                    <button onclick={onlogout}>{ "Log out" }</button>
                }
            </nav>
        };
    }

    let user = storage::load_session(SessionSlot::User);
    let onlogout = Callback::from(move |_: MouseEvent| {
        storage::clear_session(SessionSlot::User);
        if let Some(navigator) = &navigator {
            navigator.push(&Route::Diaries);
        }
        refresh.force_update();
    });

    html! {
        <nav class="navbar">
            <Link<Route> to={Route::Diaries} classes="brand">{ "Travel Diaries" }</Link<Route>>
            if let Some(session) = user {
                <Link<Route> to={Route::Publish}>{ "Publish" }</Link<Route>>
                <Link<Route> to={Route::MyDiaries}>{ "My diaries" }</Link<Route>>
                <Link<Route> to={Route::Profile}>{ session.user.display_name().to_string() }</Link<Route>>
                <button onclick={onlogout}>{ "Log out" }</button>
            } else {
                <Link<Route> to={Route::Login}>{ "Log in / Register" }</Link<Route>>
            }
        </nav>
    }
}
