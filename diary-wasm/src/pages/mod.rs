pub mod admin;
pub mod auth;
pub mod detail;
pub mod diaries;
pub mod edit;
pub mod my_diaries;
pub mod profile;
pub mod publish;

use diary_client::media::MediaFile;
use diary_client::models::DiaryStatus;
use web_sys::{File, HtmlInputElement, HtmlTextAreaElement};
use yew::prelude::*;

pub fn input_value(e: InputEvent) -> String {
    let input: HtmlInputElement = e.target_unchecked_into();
    input.value()
}

pub fn textarea_value(e: InputEvent) -> String {
    let input: HtmlTextAreaElement = e.target_unchecked_into();
    input.value()
}

/// Files picked in an `<input type="file">`. The input is reset so the
/// same file can be picked again.
pub fn picked_files(e: Event) -> Vec<File> {
    let input: HtmlInputElement = e.target_unchecked_into();
    let mut files = Vec::new();
    if let Some(list) = input.files() {
        for i in 0..list.length() {
            if let Some(file) = list.get(i) {
                files.push(file);
            }
        }
    }
    input.set_value("");
    files
}

pub fn media_meta(file: &File) -> MediaFile {
    MediaFile::new(file.name(), file.size() as u64).with_content_type(file.type_())
}

pub fn confirm(message: &str) -> bool {
    gloo_utils::window()
        .confirm_with_message(message)
        .unwrap_or(false)
}

pub fn alert(message: &str) {
    if let Err(e) = gloo_utils::window().alert_with_message(message) {
        log::warn!("alert failed: {:?}", e);
    }
}

pub fn view_error(error: &Option<String>) -> Html {
    match error {
        Some(error) => html! {
            <div class="error">{ error }</div>
        },
        None => html! {},
    }
}

pub fn view_loading(loading: bool) -> Html {
    if loading {
        html! { <div class="loading">{ "Loading..." }</div> }
    } else {
        html! {}
    }
}

pub fn status_class(status: DiaryStatus) -> &'static str {
    match status {
        DiaryStatus::Pending => "status pending",
        DiaryStatus::Approved => "status approved",
        DiaryStatus::Rejected => "status rejected",
    }
}
