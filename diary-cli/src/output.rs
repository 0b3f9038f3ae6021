use chrono::Local;
use colored::{ColoredString, Colorize};
use diary_client::carousel::Carousel;
use diary_client::media::resolve_media_url;
use diary_client::models::{Diary, DiaryStatus, UserProfile};
use diary_client::moderation::ModerationAction;

pub fn status_badge(status: DiaryStatus) -> ColoredString {
    match status {
        DiaryStatus::Pending => status.label().yellow(),
        DiaryStatus::Approved => status.label().green(),
        DiaryStatus::Rejected => status.label().red(),
    }
}

/// One line per diary in public listings.
pub fn print_diary_row(index: usize, diary: &Diary) {
    println!(
        "   {}. [{}] {}",
        index,
        diary.id,
        diary.title.bold()
    );
    println!(
        "      by {} on {}",
        diary.author_nickname(),
        diary.created_date()
    );
    if let Some(cover) = diary.cover_image() {
        println!("      Cover: {}", cover);
    }
    println!();
}

pub fn print_own_diary(index: usize, diary: &Diary) {
    println!(
        "   {}. [{}] {}  {}",
        index,
        diary.id,
        diary.title.bold(),
        status_badge(diary.status)
    );
    println!("      Created: {}", diary.created_date());
    if diary.status == DiaryStatus::Rejected {
        if let Some(reason) = &diary.reject_reason {
            println!("      Reason: {}", reason);
        }
    }
    println!("      Content: {}", truncate(&diary.content, 50));
    println!();
}

pub fn print_diary_detail(diary: &Diary, base_url: &str) {
    println!("   ID: {}", diary.id);
    println!("   Title: {}", diary.title.bold());
    println!("   Author: {}", diary.author_nickname());
    println!(
        "   Created: {}",
        diary
            .created_at
            .with_timezone(&Local)
            .format("%Y-%m-%d %H:%M")
    );
    println!("   Status: {}", status_badge(diary.status));
    if let Some(reason) = &diary.reject_reason {
        println!("   Reject reason: {}", reason);
    }
    println!();
    println!("{}", diary.content);
    println!();

    let mut carousel = Carousel::new(diary.images.len());
    if carousel.is_empty() {
        println!("   No images");
    } else {
        println!("   Images:");
        for _ in 0..carousel.len() {
            if let (Some(i), Some(label)) = (carousel.current(), carousel.position_label()) {
                println!(
                    "     {:>7}  {}",
                    label,
                    resolve_media_url(base_url, &diary.images[i])
                );
            }
            carousel.next();
        }
    }

    if let Some(video) = diary.video_url.as_deref().filter(|v| !v.is_empty()) {
        println!("   Video: {}", resolve_media_url(base_url, video));
    }
}

pub fn print_admin_row(diary: &Diary) {
    println!(
        "   [{}] {}  {}",
        diary.id,
        diary.title.bold(),
        status_badge(diary.status)
    );
    println!(
        "      by {} on {}",
        diary.author_nickname(),
        diary.created_date()
    );
    if let Some(reason) = &diary.reject_reason {
        println!("      Reason: {}", reason);
    }

    let actions: Vec<&str> = ModerationAction::available_for(diary.status)
        .iter()
        .map(|a| a.label())
        .collect();
    println!("      Actions: {}", actions.join(", "));
    println!();
}

pub fn print_profile(user: &UserProfile, base_url: &str) {
    println!("   ID: {}", user.id);
    println!("   Username: {}", user.username);
    println!("   Nickname: {}", user.display_name());
    if let Some(email) = &user.email {
        println!("   Email: {}", email);
    }
    match &user.avatar_url {
        Some(avatar) => println!("   Avatar: {}", resolve_media_url(base_url, avatar)),
        None => println!("   Avatar: (default)"),
    }
    if !user.role.is_empty() {
        println!("   Role: {}", user.role);
    }
}

/// Cuts on a char boundary.
pub fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max_chars).collect();
        format!("{}...", cut)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_counts_chars_not_bytes() {
        assert_eq!(truncate("Привет, мир", 6), "Привет...");
        assert_eq!(truncate("short", 50), "short");
    }
}
