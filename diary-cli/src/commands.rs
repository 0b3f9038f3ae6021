use crate::cli::{AdminCommands, Commands};
use crate::output::{self, print_admin_row, print_diary_detail, print_diary_row, print_own_diary};
use diary_client::feed::{DiaryFeed, SearchFilter};
use diary_client::http_client::UploadFile;
use diary_client::media::MediaFile;
use diary_client::models::{Diary, ListQuery};
use diary_client::moderation::{can_edit, ModerationAction, StatusFilter};
use diary_client::session::{FileStore, Session, SessionSlot, SessionStore};
use diary_client::validation::{self, RegistrationForm};
use diary_client::{DiaryClient, DiaryClientError, DiaryDraft, DiaryEdit};
use serde::Serialize;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

pub struct App {
    pub client: DiaryClient,
    pub sessions: SessionStore<FileStore>,
    pub slot: SessionSlot,
    pub session: Option<Session>,
    pub json: bool,
}

impl App {
    fn viewer_id(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.user.id.as_str())
    }

    fn print_json<T: Serialize>(&self, value: &T) -> Result<(), DiaryClientError> {
        let raw = serde_json::to_string_pretty(value)
            .map_err(|e| DiaryClientError::SerializationError(e.to_string()))?;
        println!("{}", raw);
        Ok(())
    }
}

pub async fn run(app: &App, command: Commands) -> Result<(), DiaryClientError> {
    match command {
        Commands::Register {
            username,
            nickname,
            password,
            confirm_password,
        } => {
            let form = RegistrationForm {
                username,
                nickname,
                password,
                confirm_password,
            };
            println!("📝 Registering user: {}", form.username.trim());

            let response = app.client.register(&form).await?;
            println!(
                "✅ {}",
                response
                    .message
                    .as_deref()
                    .unwrap_or("Registration successful!")
            );
            println!(
                "   Now log in: diary-cli login --username {} --password <password>",
                form.username.trim()
            );
        }

        Commands::Login { username, password } => {
            println!("🔑 Logging in as: {}", username.trim());

            let response = app.client.login(username, password).await?;
            let session = Session::from_login(response);
            app.sessions.save(SessionSlot::User, &session)?;

            println!("✅ Welcome, {}!", session.user.display_name());
            println!(
                "   Session saved to {}",
                app.sessions.backend().path().display()
            );
        }

        Commands::Logout => logout(app, SessionSlot::User).await?,

        Commands::Status => status(app)?,

        Commands::List {
            title,
            author,
            page,
            page_size,
            all,
        } => {
            let filter = SearchFilter {
                title: title.unwrap_or_default(),
                author_nickname: author.unwrap_or_default(),
            };
            list(app, filter, page, page_size, all).await?;
        }

        Commands::Show { id } => {
            let diary = app.client.get_diary(&id).await?;
            if app.json {
                return app.print_json(&diary);
            }

            print_diary_detail(&diary, app.client.base_url());
            if can_edit(&diary, app.viewer_id()) {
                println!();
                println!("   ✏️  You can still edit this diary: diary-cli edit {}", diary.id);
            }
        }

        Commands::Publish {
            title,
            content,
            images,
            video,
        } => {
            // Размеры проверяем до чтения файлов в память
            let image_meta = media_meta_all(&images).await?;
            let video_meta = match &video {
                Some(path) => Some(media_meta(path).await?),
                None => None,
            };
            validation::validate_publish(&title, &content, &image_meta, video_meta.as_ref())?;

            let mut uploads = Vec::with_capacity(images.len());
            for path in &images {
                uploads.push(UploadFile::from_path(path).await?);
            }
            let video = match video {
                Some(path) => Some(UploadFile::from_path(path).await?),
                None => None,
            };

            println!("📝 Publishing \"{}\" with {} image(s)...", title.trim(), uploads.len());
            let diary = app
                .client
                .publish_diary(DiaryDraft {
                    title,
                    content,
                    images: uploads,
                    video,
                })
                .await?;

            if app.json {
                return app.print_json(&diary);
            }
            println!("✅ Diary submitted for review");
            println!("   ID: {}", diary.id);
            println!("   Status: {}", output::status_badge(diary.status));
        }

        Commands::Edit {
            id,
            title,
            content,
            video_url,
        } => {
            let current = app.client.get_diary(&id).await?;
            let edit = DiaryEdit {
                title: title.unwrap_or(current.title),
                content: content.unwrap_or(current.content),
                video_url: video_url.or(current.video_url),
            };

            println!("✏️ Updating diary #{}", id);
            let diary = app.client.edit_diary(&id, edit).await?;

            if app.json {
                return app.print_json(&diary);
            }
            println!("✅ Diary updated");
            println!("   Title: {}", diary.title);
            println!("   Status: {}", output::status_badge(diary.status));
        }

        Commands::Delete { id, yes } => {
            if !yes && !confirm("Delete this diary? This cannot be undone.")? {
                println!("Cancelled");
                return Ok(());
            }

            app.client.delete_diary(&id).await?;
            println!("✅ Diary #{} deleted", id);
        }

        Commands::Mine => {
            let diaries = app.client.my_diaries().await?;
            if app.json {
                return app.print_json(&diaries);
            }

            if diaries.is_empty() {
                println!("   You have not published any diaries yet");
                println!("   Tip: diary-cli publish --title <title> --content <text> --image <file>");
            } else {
                println!("📋 Your diaries ({})", diaries.len());
                println!();
                for (i, diary) in diaries.iter().enumerate() {
                    print_own_diary(i + 1, diary);
                }
            }
        }

        Commands::Profile => {
            let user = app.client.current_user().await?;
            if let Some(session) = &app.session {
                let refreshed = Session {
                    token: session.token.clone(),
                    user: user.clone(),
                };
                app.sessions.save(app.slot, &refreshed)?;
            }

            if app.json {
                return app.print_json(&user);
            }
            output::print_profile(&user, app.client.base_url());
        }

        Commands::ProfileUpdate { nickname, avatar } => {
            profile_update(app, nickname, avatar).await?;
        }

        Commands::Admin(admin) => run_admin(app, admin).await?,
    }

    Ok(())
}

async fn run_admin(app: &App, command: AdminCommands) -> Result<(), DiaryClientError> {
    match command {
        AdminCommands::Login { username, password } => {
            println!("🔑 Logging in to the dashboard as: {}", username.trim());

            let response = app.client.admin_login(username, password).await?;
            let session = Session::from_login(response);
            app.sessions.save(SessionSlot::Admin, &session)?;

            println!("✅ Logged in as administrator {}", session.user.display_name());
        }

        AdminCommands::Logout => logout(app, SessionSlot::Admin).await?,

        AdminCommands::List { status } => {
            let diaries = app.client.admin_list_diaries(status).await?;
            print_admin_list(app, status, &diaries)?;
        }

        AdminCommands::Approve { id, yes } => {
            moderate(app, &id, ModerationAction::Approve, None, yes).await?
        }
        AdminCommands::Reject { id, reason, yes } => {
            moderate(app, &id, ModerationAction::Reject, reason, yes).await?
        }
        AdminCommands::Revoke { id, yes } => {
            moderate(app, &id, ModerationAction::Revoke, None, yes).await?
        }
        AdminCommands::ReReview { id, yes } => {
            moderate(app, &id, ModerationAction::ReReview, None, yes).await?
        }
        AdminCommands::Delete { id, yes } => {
            moderate(app, &id, ModerationAction::Delete, None, yes).await?
        }
    }

    Ok(())
}

async fn logout(app: &App, slot: SessionSlot) -> Result<(), DiaryClientError> {
    app.sessions.clear(slot)?;
    app.client.clear_token().await;
    println!("✅ Logged out");
    Ok(())
}

fn status(app: &App) -> Result<(), DiaryClientError> {
    println!("🔑 Session file: {}", app.sessions.backend().path().display());

    for (slot, label) in [(SessionSlot::User, "User"), (SessionSlot::Admin, "Admin")] {
        match app.sessions.load(slot)? {
            Some(session) => {
                let preview: String = session.token.chars().take(12).collect();
                println!(
                    "   {}: ✅ {} ({}) token {}...",
                    label,
                    session.user.display_name(),
                    session.user.username,
                    preview
                );
            }
            None => println!("   {}: ❌ Not logged in", label),
        }
    }

    Ok(())
}

async fn list(
    app: &App,
    filter: SearchFilter,
    page: u32,
    page_size: u32,
    all: bool,
) -> Result<(), DiaryClientError> {
    let (diaries, current, pages) = if all {
        let mut feed = DiaryFeed::new(page_size);
        let mut next = Some(feed.search(filter));

        while let Some(request) = next {
            let requested = request.query.page_number;
            match app.client.list_diaries(&request.query).await {
                Ok(response) => {
                    feed.apply(request.ticket, response);
                }
                Err(e) => {
                    feed.fail(request.ticket);
                    return Err(e);
                }
            }
            if feed.page() < requested {
                tracing::warn!(
                    requested,
                    got = feed.page(),
                    "server returned an earlier page, stopping"
                );
                break;
            }
            next = feed.load_more();
        }

        (feed.diaries().to_vec(), feed.page(), feed.pages())
    } else {
        let query = ListQuery {
            page_number: page.max(1),
            page_size,
            title: Some(filter.title),
            author_nickname: Some(filter.author_nickname),
        };
        let response = app.client.list_diaries(&query).await?;
        (response.diaries, response.page, response.pages)
    };

    if app.json {
        return app.print_json(&diaries);
    }

    println!("📋 {} diaries (page {} of {})", diaries.len(), current, pages.max(1));
    println!();

    if diaries.is_empty() {
        println!("   No diaries found");
        return Ok(());
    }

    for (i, diary) in diaries.iter().enumerate() {
        print_diary_row(i + 1, diary);
    }

    if current < pages {
        println!("   More: diary-cli list --page {}", current + 1);
    } else {
        println!("   That's everything");
    }

    Ok(())
}

async fn profile_update(
    app: &App,
    nickname: Option<String>,
    avatar: Option<PathBuf>,
) -> Result<(), DiaryClientError> {
    if nickname.is_none() && avatar.is_none() {
        println!("Nothing to update, pass --nickname and/or --avatar");
        return Ok(());
    }

    if let Some(nickname) = &nickname {
        validation::validate_nickname(nickname)?;
    }
    let avatar = match avatar {
        Some(path) => {
            validation::validate_avatar(&media_meta(&path).await?)?;
            Some(UploadFile::from_path(&path).await?)
        }
        None => None,
    };

    let current = app.client.current_user().await?;
    let nickname = nickname.unwrap_or_else(|| current.nickname.clone());

    let changes = app
        .client
        .update_profile(&current, &nickname, avatar, |patch| {
            if let Err(e) = app.sessions.update_user(app.slot, patch) {
                tracing::warn!(error = %e, "failed to update cached user");
            }
        })
        .await?;
    if changes.is_unchanged() {
        println!("Nothing changed");
        return Ok(());
    }

    println!("✅ Profile updated");
    if let Some(nickname) = &changes.nickname {
        println!("   Nickname: {}", nickname);
    }
    if let Some(avatar_url) = &changes.avatar_url {
        println!(
            "   Avatar: {}",
            diary_client::media::resolve_media_url(app.client.base_url(), avatar_url)
        );
    }

    Ok(())
}

/// The dashboard acts on the status it last saw, so the row is looked up
/// first.
async fn moderate(
    app: &App,
    id: &str,
    action: ModerationAction,
    reason: Option<String>,
    confirmed: bool,
) -> Result<(), DiaryClientError> {
    action.checked_reason(reason.as_deref())?;

    let diaries = app.client.admin_list_diaries(StatusFilter::All).await?;
    let diary = diaries
        .iter()
        .find(|d| d.id == id)
        .ok_or_else(|| DiaryClientError::NotFound(format!("Diary {} not found", id)))?;

    // refuse before asking, not after
    action.prepare(diary.status, reason.as_deref())?;

    if !confirmed && !confirm(action.confirmation_prompt())? {
        println!("Cancelled");
        return Ok(());
    }

    let refreshed = app
        .client
        .moderate(
            id,
            diary.status,
            action,
            reason.as_deref(),
            StatusFilter::All,
        )
        .await?;

    println!("✅ {}", action.success_message());
    if let Some(updated) = refreshed.iter().find(|d| d.id == id) {
        print_admin_row(updated);
    }

    Ok(())
}

fn print_admin_list(
    app: &App,
    filter: StatusFilter,
    diaries: &[Diary],
) -> Result<(), DiaryClientError> {
    if app.json {
        return app.print_json(&diaries);
    }

    println!("📋 {}: {} diaries", filter.label(), diaries.len());
    println!();
    if diaries.is_empty() {
        println!("   Nothing to moderate");
    }
    for diary in diaries {
        print_admin_row(diary);
    }
    Ok(())
}

async fn media_meta(path: &Path) -> Result<MediaFile, DiaryClientError> {
    let size = tokio::fs::metadata(path).await?.len();
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok(MediaFile::new(name, size))
}

async fn media_meta_all(paths: &[PathBuf]) -> Result<Vec<MediaFile>, DiaryClientError> {
    let mut files = Vec::with_capacity(paths.len());
    for path in paths {
        files.push(media_meta(path).await?);
    }
    Ok(files)
}

/// Anything but y/yes, including closed stdin, counts as no.
fn confirm(prompt: &str) -> Result<bool, DiaryClientError> {
    print!("{} [y/N] ", prompt);
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    let answer = answer.trim().to_ascii_lowercase();
    Ok(answer == "y" || answer == "yes")
}
