//! TUI Rendering
//!
//! Main rendering logic for the terminal interface.

use super::app::{App, Toast, ToastKind};
use super::onboarding_render::{self, ACCENT_GOLD, BRAND_BLUE, BRAND_GOLD, centered};
use crate::auth::AuthScreen;
use crate::auth::Route;
use crate::auth::forms::Field;
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

/// Render the entire UI
pub fn render(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(10),   // Main content
            Constraint::Length(1), // Toast line
        ])
        .split(f.area());

    match app.route {
        Route::Auth(screen) => render_auth(f, app, screen, chunks[0]),
        Route::Wizard => {
            let view = app.wizard.view();
            onboarding_render::render_wizard(
                f,
                chunks[0],
                &view,
                &app.wizard_input,
                app.animation_frame,
            );
        }
    }

    if let Some(toast) = &app.toast {
        render_toast(f, toast, chunks[1]);
    }
}

fn render_auth(f: &mut Frame, app: &App, screen: AuthScreen, area: Rect) {
    let forms = &app.auth_forms;
    let fields = forms.fields(screen);
    let height = (fields.len() as u16) * 3 + 12;
    let box_area = centered(area, 64, height);

    let mut lines: Vec<Line<'static>> = vec![
        Line::from(""),
        Line::from(Span::styled(
            screen.title(),
            Style::default().fg(BRAND_GOLD).add_modifier(Modifier::BOLD),
        ))
        .alignment(Alignment::Center),
        Line::from(Span::styled(
            screen.subtitle(),
            Style::default().fg(Color::DarkGray),
        ))
        .alignment(Alignment::Center),
        Line::from(""),
    ];

    if screen == AuthScreen::VerifyOtp {
        if let Some(email) = &app.auth.email_for_reset {
            lines.push(
                Line::from(Span::styled(
                    email.clone(),
                    Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
                ))
                .alignment(Alignment::Center),
            );
            lines.push(Line::from(""));
        }
    }

    for (i, field) in fields.iter().enumerate() {
        let focused = i == forms.focused;
        let value = forms.value(screen, *field);
        lines.push(Line::from(Span::styled(
            format!("  {}", field_label(*field)),
            Style::default().fg(if focused { BRAND_BLUE } else { Color::Gray }),
        )));
        lines.push(input_line(*field, &value, focused));
        match forms.errors.get(*field) {
            Some(error) => lines.push(Line::from(Span::styled(
                format!("    {}", error),
                Style::default().fg(Color::Red),
            ))),
            None => lines.push(Line::from("")),
        }
    }

    if screen == AuthScreen::VerifyOtp {
        let resend = if forms.countdown.can_resend() {
            Line::from(vec![
                Span::styled(
                    "  [Ctrl+R] ",
                    Style::default().fg(ACCENT_GOLD).add_modifier(Modifier::BOLD),
                ),
                Span::styled("Resend code", Style::default().fg(Color::White)),
            ])
        } else {
            Line::from(Span::styled(
                format!("  Resend code in {}s", forms.countdown.remaining()),
                Style::default().fg(Color::DarkGray),
            ))
        };
        lines.push(resend);
    }

    lines.push(Line::from(""));
    lines.push(submit_line(screen, app.auth.is_loading, app.animation_frame));
    lines.push(Line::from(""));
    lines.push(links_line(screen));

    f.render_widget(Clear, box_area);
    let dialog = Paragraph::new(lines).wrap(Wrap { trim: false }).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(BRAND_BLUE))
            .title(Span::styled(
                " VTrade ",
                Style::default().fg(BRAND_BLUE).add_modifier(Modifier::BOLD),
            )),
    );
    f.render_widget(dialog, box_area);
}

fn field_label(field: Field) -> &'static str {
    match field {
        Field::Email => "Email",
        Field::EmailOrPhone => "Email or Phone",
        Field::Password => "Password",
        Field::ConfirmPassword => "Confirm Password",
        Field::UserType => "User Type",
        Field::IndividualType => "Individual Type",
        Field::Otp => "OTP",
    }
}

fn input_line(field: Field, value: &str, focused: bool) -> Line<'static> {
    let text = match field {
        Field::Password | Field::ConfirmPassword => "*".repeat(value.chars().count()),
        Field::Otp => {
            let mut boxes: Vec<String> = value.chars().map(|c| format!("[{}]", c)).collect();
            while boxes.len() < 6 {
                boxes.push("[ ]".to_string());
            }
            boxes.join(" ")
        }
        Field::UserType | Field::IndividualType => format!("< {} >", value),
        _ => value.to_string(),
    };
    let cursor = if focused && !matches!(field, Field::UserType | Field::IndividualType) {
        "_"
    } else {
        ""
    };

    Line::from(vec![
        Span::styled(
            if focused { "  > " } else { "    " },
            Style::default().fg(ACCENT_GOLD),
        ),
        Span::styled(
            format!("{}{}", text, cursor),
            Style::default().fg(if focused { Color::White } else { Color::Gray }),
        ),
    ])
}

fn submit_line(screen: AuthScreen, loading: bool, frame: usize) -> Line<'static> {
    if loading {
        let dots = ".".repeat(frame % 4);
        return Line::from(Span::styled(
            format!("  Please wait{}", dots),
            Style::default().fg(BRAND_GOLD),
        ));
    }
    let action = match screen {
        AuthScreen::SignIn => "Sign In",
        AuthScreen::SignUp => "Create Account",
        AuthScreen::ForgotPassword => "Send OTP",
        AuthScreen::VerifyOtp => "Verify",
        AuthScreen::ResetPassword => "Reset Password",
    };
    Line::from(vec![
        Span::styled(
            "  [Enter] ",
            Style::default().fg(ACCENT_GOLD).add_modifier(Modifier::BOLD),
        ),
        Span::styled(action, Style::default().fg(Color::White)),
        Span::styled(
            "   [Tab] Next Field",
            Style::default().fg(Color::DarkGray),
        ),
    ])
}

fn links_line(screen: AuthScreen) -> Line<'static> {
    let text = match screen {
        AuthScreen::SignIn => "  [Ctrl+N] Create an account   [Ctrl+F] Forgot password   [Ctrl+C] Quit",
        AuthScreen::VerifyOtp => "  [Esc] Change email   [Ctrl+C] Quit",
        _ => "  [Esc] Back to sign in   [Ctrl+C] Quit",
    };
    Line::from(Span::styled(text, Style::default().fg(Color::DarkGray)))
}

fn render_toast(f: &mut Frame, toast: &Toast, area: Rect) {
    let (marker, color) = match toast.kind {
        ToastKind::Info => ("i", BRAND_BLUE),
        ToastKind::Success => ("✓", Color::Green),
        ToastKind::Error => ("!", Color::Red),
    };
    let line = Line::from(vec![
        Span::styled(
            format!(" {} ", marker),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ),
        Span::styled(toast.text.clone(), Style::default().fg(color)),
    ]);
    f.render_widget(Paragraph::new(line), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use ratatui::{Terminal, backend::TestBackend};
    use tempfile::TempDir;

    fn screen_text(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(120, 40)).unwrap();
        terminal.draw(|f| render(f, app)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    fn app(dir: &TempDir) -> App {
        let mut config = Config::default();
        config.session.path = dir.path().join("session.json");
        App::new(config).unwrap()
    }

    #[test]
    fn test_password_is_masked() {
        assert_eq!(
            input_line(Field::Password, "hunter2", false).spans[1].content,
            "*******"
        );
    }

    #[test]
    fn test_otp_boxes() {
        let line = input_line(Field::Otp, "12", false);
        assert_eq!(line.spans[1].content, "[1] [2] [ ] [ ] [ ] [ ]");
    }

    #[tokio::test]
    async fn test_sign_in_screen_renders() {
        let dir = TempDir::new().unwrap();
        let text = screen_text(&app(&dir));
        assert!(text.contains("Sign In"));
        assert!(text.contains("Welcome back!"));
    }

    #[tokio::test]
    async fn test_wizard_renders_after_skip() {
        let dir = TempDir::new().unwrap();
        let mut app = app(&dir);
        app.skip_auth();
        let text = screen_text(&app);
        assert!(text.contains("Step 1 of 7"));
    }
}
