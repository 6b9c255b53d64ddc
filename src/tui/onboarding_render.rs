//! Onboarding Wizard Rendering
//!
//! Draws a [`StepView`]: sidebar, step body, navigation footer and the two
//! overlay modals. Nothing here reads wizard state directly.

use super::onboarding::WizardInput;
use crate::onboarding::draft::{AssetSummary, Fees, Speed};
use crate::onboarding::view::{
    ConnectedWallet, FieldView, SidebarItem, StepBody, StepView, WalletModalView,
};
use crate::onboarding::{ConnectingStatus, DraftField, IssuedAsset, WalletOption};
use crate::utils::{short_address, truncate_str};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

/// Main color palette
pub const BRAND_BLUE: Color = Color::Rgb(70, 130, 180);
pub const BRAND_GOLD: Color = Color::Rgb(218, 165, 32);
pub const ACCENT_GOLD: Color = Color::Rgb(184, 134, 11);

const SPINNER: [&str; 4] = ["|", "/", "-", "\\"];

/// Render the whole wizard into `area`
pub fn render_wizard(
    f: &mut Frame,
    area: Rect,
    view: &StepView,
    input: &WizardInput,
    frame: usize,
) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(8),
            Constraint::Length(2),
        ])
        .split(area);

    render_header(f, rows[0], view);

    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(40), Constraint::Min(30)])
        .split(rows[1]);

    render_sidebar(f, cols[0], &view.sidebar);
    render_body(f, cols[1], view, input);
    render_footer(f, rows[2], view);

    if let Some(modal) = &view.wallet_modal {
        render_wallet_modal(f, area, modal, input, frame);
    }
    if let Some(asset) = &view.success_modal {
        render_success_modal(f, area, asset);
    }
}

fn render_header(f: &mut Frame, area: Rect, view: &StepView) {
    let (current, total) = view.progress;
    let mut spans = vec![
        Span::styled(
            format!(" {} ", render_progress_dots(current, total)),
            Style::default().fg(BRAND_BLUE),
        ),
        Span::styled(
            format!(" Step {} of {} ", current, total),
            Style::default().fg(Color::DarkGray),
        ),
    ];

    match &view.wallet {
        Some(ConnectedWallet { provider, address }) => {
            spans.push(Span::styled(
                format!("  {} ", provider.label()),
                Style::default().fg(Color::Green),
            ));
            spans.push(Span::styled(
                short_address(address),
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            ));
        }
        None => spans.push(Span::styled(
            "  Wallet not connected",
            Style::default().fg(Color::DarkGray),
        )),
    }

    let header = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(BRAND_BLUE))
            .title(Span::styled(
                " VTrade Asset Issuance ",
                Style::default().fg(BRAND_BLUE).add_modifier(Modifier::BOLD),
            )),
    );
    f.render_widget(header, area);
}

/// Render progress dots (filled for completed, hollow for remaining)
fn render_progress_dots(current: usize, total: usize) -> String {
    (1..=total)
        .map(|i| if i <= current { "●" } else { "○" })
        .collect::<Vec<_>>()
        .join(" ")
}

fn render_sidebar(f: &mut Frame, area: Rect, items: &[SidebarItem]) {
    let mut lines: Vec<Line<'static>> = vec![Line::from("")];

    for item in items {
        let (marker, color) = if item.completed {
            ("✓", Color::Green)
        } else if item.active {
            ("●", BRAND_GOLD)
        } else {
            ("○", Color::DarkGray)
        };
        let title_style = if item.active {
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD)
        } else if item.reachable {
            Style::default().fg(Color::Gray)
        } else {
            Style::default().fg(Color::DarkGray)
        };

        let mut spans = vec![
            Span::styled(format!(" {} ", marker), Style::default().fg(color)),
            Span::styled(format!("{}. {}", item.number, item.title), title_style),
        ];
        if !item.reachable {
            spans.push(Span::styled(" (locked)", Style::default().fg(Color::DarkGray)));
        }
        lines.push(Line::from(spans));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        " Alt+1..7 jump to a step",
        Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
    )));

    let sidebar = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray))
                .title(" Steps "),
        )
        .wrap(Wrap { trim: false });
    f.render_widget(sidebar, area);
}

fn render_body(f: &mut Frame, area: Rect, view: &StepView, input: &WizardInput) {
    let mut lines: Vec<Line<'static>> = vec![
        Line::from(""),
        Line::from(Span::styled(
            view.title.to_string(),
            Style::default().fg(BRAND_GOLD).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            view.description.to_string(),
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(""),
    ];

    match &view.body {
        StepBody::ConnectWalletPrompt { message } => render_prompt(&mut lines, message),
        StepBody::AssetType { options, selected } => {
            for (i, option) in options.iter().enumerate() {
                push_choice(
                    &mut lines,
                    i == input.cursor,
                    *selected == Some(*option),
                    option.heading(),
                    option.description(),
                );
            }
        }
        StepBody::Network { options, selected } => {
            for (i, network) in options.iter().enumerate() {
                let tags = format!(
                    "{}  |  Fees: {}  |  Speed: {}",
                    network.symbol,
                    fees_label(network.fees),
                    speed_label(network.speed)
                );
                push_choice(
                    &mut lines,
                    i == input.cursor,
                    selected.as_deref() == Some(network.id),
                    network.name,
                    &tags,
                );
            }
        }
        StepBody::Wallet { option, connected } => {
            render_wallet_step(&mut lines, *option, connected.as_ref(), input)
        }
        StepBody::PreMinting { items } => {
            for (i, (item, done)) in items.iter().enumerate() {
                let marker = if *done { "[✓]" } else { "[ ]" };
                let focused = i == input.cursor;
                lines.push(Line::from(vec![
                    Span::styled(
                        if focused { " > " } else { "   " },
                        Style::default().fg(ACCENT_GOLD),
                    ),
                    Span::styled(
                        marker,
                        Style::default().fg(if *done { Color::Green } else { Color::DarkGray }),
                    ),
                    Span::styled(
                        format!(" {}", item.title()),
                        Style::default()
                            .fg(if focused { Color::White } else { Color::Gray })
                            .add_modifier(if focused { Modifier::BOLD } else { Modifier::empty() }),
                    ),
                ]));
                lines.push(Line::from(Span::styled(
                    format!("       {}", item.description()),
                    Style::default().fg(Color::DarkGray),
                )));
            }
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                "  [Space] Complete item   [r] Reset checklist",
                Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
            )));
        }
        StepBody::AssetInfo { fields } => render_fields(&mut lines, fields, input, None),
        StepBody::AssetDetails {
            fields,
            vesting_options,
        } => render_fields(&mut lines, fields, input, Some(*vesting_options)),
        StepBody::Summary {
            summary,
            accepted_terms,
        } => render_summary(&mut lines, summary, *accepted_terms),
    }

    let body = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(BRAND_BLUE)),
        )
        .wrap(Wrap { trim: false });
    f.render_widget(body, area);
}

fn render_prompt(lines: &mut Vec<Line<'static>>, message: &str) {
    lines.push(Line::from(Span::styled(
        "  Connect your wallet first",
        Style::default().fg(BRAND_GOLD).add_modifier(Modifier::BOLD),
    )));
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        format!("  {}", message),
        Style::default().fg(Color::Gray),
    )));
    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled(
            "  [Enter] ",
            Style::default().fg(ACCENT_GOLD).add_modifier(Modifier::BOLD),
        ),
        Span::styled("Connect Wallet", Style::default().fg(Color::White)),
    ]));
}

fn push_choice(
    lines: &mut Vec<Line<'static>>,
    focused: bool,
    selected: bool,
    title: &str,
    detail: &str,
) {
    lines.push(Line::from(vec![
        Span::styled(
            if focused { " > " } else { "   " },
            Style::default().fg(ACCENT_GOLD),
        ),
        Span::styled(
            if selected { "[*]" } else { "[ ]" },
            Style::default().fg(if selected { BRAND_GOLD } else { Color::DarkGray }),
        ),
        Span::styled(
            format!(" {}", title),
            Style::default()
                .fg(if selected { Color::White } else { Color::Gray })
                .add_modifier(if selected { Modifier::BOLD } else { Modifier::empty() }),
        ),
    ]));
    lines.push(Line::from(Span::styled(
        format!("       {}", detail),
        Style::default().fg(Color::DarkGray),
    )));
    lines.push(Line::from(""));
}

fn render_wallet_step(
    lines: &mut Vec<Line<'static>>,
    option: Option<WalletOption>,
    connected: Option<&ConnectedWallet>,
    input: &WizardInput,
) {
    push_choice(
        lines,
        input.cursor == 0,
        option == Some(WalletOption::New),
        "Create a new wallet",
        "Set up a fresh wallet with one of the supported providers",
    );
    push_choice(
        lines,
        input.cursor == 1,
        option == Some(WalletOption::Existing),
        "Connect an existing wallet",
        "Use a wallet you already have",
    );

    match connected {
        Some(wallet) => {
            lines.push(Line::from(vec![
                Span::styled("  Connected: ", Style::default().fg(Color::DarkGray)),
                Span::styled(
                    format!("{} {}", wallet.provider.label(), short_address(&wallet.address)),
                    Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
                ),
            ]));
            lines.push(Line::from(Span::styled(
                "  [Ctrl+D] Disconnect",
                Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
            )));
        }
        None => lines.push(Line::from(Span::styled(
            "  [Enter] Choose a wallet provider",
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        ))),
    }
}

fn render_fields(
    lines: &mut Vec<Line<'static>>,
    fields: &[FieldView],
    input: &WizardInput,
    vesting_options: Option<&[&str]>,
) {
    for (i, field) in fields.iter().enumerate() {
        let focused = i == input.focused_field;
        let label_style = Style::default().fg(if focused { BRAND_BLUE } else { Color::DarkGray });

        let (display, value_color) = if field.value.is_empty() {
            (placeholder(field.field).to_string(), Color::DarkGray)
        } else {
            (
                field.value.clone(),
                if focused { Color::White } else { Color::Gray },
            )
        };
        let cursor = if focused && field.field != DraftField::VestingPeriod {
            "_"
        } else {
            ""
        };

        lines.push(Line::from(vec![
            Span::styled(format!("  {:<22}", format!("{}:", field.field.label())), label_style),
            Span::styled(format!("{}{}", display, cursor), Style::default().fg(value_color)),
        ]));

        if focused && field.field == DraftField::VestingPeriod {
            if let Some(options) = vesting_options {
                lines.push(Line::from(Span::styled(
                    format!("  {:<22}{}", "", options.join(" / ")),
                    Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
                )));
            }
        }
        lines.push(Line::from(""));
    }
}

fn placeholder(field: DraftField) -> &'static str {
    match field {
        DraftField::AssetName => "e.g. Downtown Office Tower",
        DraftField::AssetSymbol => "e.g. DOT",
        DraftField::AssetDescription => "Describe the asset",
        DraftField::TotalSupply => "e.g. 1000000",
        DraftField::TokenPrice => "e.g. 0.5",
        DraftField::OfferingPercentage => "e.g. 20",
        DraftField::VestingPeriod => "Select a vesting period (←/→)",
    }
}

fn render_summary(lines: &mut Vec<Line<'static>>, summary: &AssetSummary, accepted: bool) {
    let rows = [
        ("Asset Type", &summary.asset_type),
        ("Network", &summary.network),
        ("Wallet", &summary.wallet_address),
        ("Asset Name", &summary.asset_name),
        ("Asset Symbol", &summary.asset_symbol),
        ("Description", &summary.asset_description),
        ("Total Supply", &summary.total_supply),
        ("Token Price", &summary.token_price),
        ("Offering", &summary.offering_percentage),
        ("Vesting Period", &summary.vesting_period),
        ("Market Cap", &summary.market_cap),
    ];
    for (label, value) in rows {
        lines.push(Line::from(vec![
            Span::styled(format!("  {:<16}", label), Style::default().fg(Color::DarkGray)),
            Span::styled(value.clone(), Style::default().fg(Color::White)),
        ]));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled(
            if accepted { "  [✓] " } else { "  [ ] " },
            Style::default().fg(if accepted { Color::Green } else { Color::DarkGray }),
        ),
        Span::styled(
            "I accept the terms and conditions",
            Style::default().fg(Color::Gray),
        ),
        Span::styled(
            "  [Space]",
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        ),
    ]));
}

fn render_footer(f: &mut Frame, area: Rect, view: &StepView) {
    let mut footer: Vec<Span<'static>> = Vec::new();
    if view.nav.show_back {
        footer.push(Span::styled(
            " [Esc] ",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ));
        footer.push(Span::styled("Back  ", Style::default().fg(Color::White)));
    }
    footer.push(Span::styled(
        "[Tab] ",
        Style::default().fg(BRAND_BLUE).add_modifier(Modifier::BOLD),
    ));
    footer.push(Span::styled("Next Field  ", Style::default().fg(Color::White)));
    footer.push(Span::styled(
        "[Enter] ",
        Style::default()
            .fg(if view.nav.can_proceed { ACCENT_GOLD } else { Color::DarkGray })
            .add_modifier(Modifier::BOLD),
    ));
    footer.push(Span::styled(
        format!("{}  ", view.nav.next_label),
        Style::default().fg(if view.nav.can_proceed { Color::White } else { Color::DarkGray }),
    ));
    footer.push(Span::styled(
        "[Ctrl+W] Wallet  [Ctrl+L] Sign out  [Ctrl+C] Quit",
        Style::default().fg(Color::DarkGray),
    ));

    f.render_widget(Paragraph::new(Line::from(footer)), area);
}

/// Centered rectangle of at most `width` x `height`
pub fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let v_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(height.min(area.height.saturating_sub(2))),
            Constraint::Min(0),
        ])
        .split(area);

    let h_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(width.min(area.width.saturating_sub(2))),
            Constraint::Min(0),
        ])
        .split(v_chunks[1]);

    h_chunks[1]
}

fn render_wallet_modal(
    f: &mut Frame,
    area: Rect,
    modal: &WalletModalView,
    input: &WizardInput,
    frame: usize,
) {
    let dialog_area = centered(area, 56, 16);
    let mut lines: Vec<Line<'static>> = vec![Line::from("")];

    for (i, (provider, selected)) in modal.providers.iter().enumerate() {
        let focused = i == input.modal_cursor;
        lines.push(Line::from(vec![
            Span::styled(
                if focused { " > " } else { "   " },
                Style::default().fg(ACCENT_GOLD),
            ),
            Span::styled(
                if *selected { "[*]" } else { "[ ]" },
                Style::default().fg(if *selected { BRAND_GOLD } else { Color::DarkGray }),
            ),
            Span::styled(
                format!(" {}", provider.label()),
                Style::default()
                    .fg(if *selected { Color::White } else { Color::Gray })
                    .add_modifier(if *selected { Modifier::BOLD } else { Modifier::empty() }),
            ),
        ]));
    }
    lines.push(Line::from(""));

    let status = match modal.status {
        ConnectingStatus::Idle if modal.can_connect => Line::from(Span::styled(
            "  Ready to connect",
            Style::default().fg(Color::Gray),
        )),
        ConnectingStatus::Idle => Line::from(Span::styled(
            "  Select a wallet provider",
            Style::default().fg(Color::DarkGray),
        )),
        ConnectingStatus::Connecting => Line::from(Span::styled(
            format!("  {} Connecting... approve the request in your wallet", SPINNER[frame % 4]),
            Style::default().fg(BRAND_GOLD),
        )),
        ConnectingStatus::Success => Line::from(Span::styled(
            format!(
                "  Connected {}",
                modal.address.as_deref().map(short_address).unwrap_or_default()
            ),
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        )),
        ConnectingStatus::Error => Line::from(Span::styled(
            "  Failed to connect wallet. Please try again.",
            Style::default().fg(Color::Red),
        )),
    };
    lines.push(status);
    lines.push(Line::from(""));

    let action = match modal.status {
        ConnectingStatus::Idle if modal.can_connect => "Connect",
        ConnectingStatus::Idle => "Select",
        ConnectingStatus::Error => "Try Again",
        ConnectingStatus::Success => "Done",
        ConnectingStatus::Connecting => "",
    };
    let mut footer: Vec<Span<'static>> = Vec::new();
    if !action.is_empty() {
        footer.push(Span::styled(
            " [Enter] ",
            Style::default().fg(ACCENT_GOLD).add_modifier(Modifier::BOLD),
        ));
        footer.push(Span::styled(format!("{}  ", action), Style::default().fg(Color::White)));
    }
    if modal.can_close {
        footer.push(Span::styled(
            "[Esc] ",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ));
        footer.push(Span::styled("Close", Style::default().fg(Color::White)));
    }
    lines.push(Line::from(footer));

    f.render_widget(Clear, dialog_area);
    let dialog = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(BRAND_BLUE))
            .title(Span::styled(
                " Connect Wallet ",
                Style::default().fg(BRAND_BLUE).add_modifier(Modifier::BOLD),
            )),
    );
    f.render_widget(dialog, dialog_area);
}

fn render_success_modal(f: &mut Frame, area: Rect, asset: &IssuedAsset) {
    let dialog_area = centered(area, 60, 14);
    let lines: Vec<Line<'static>> = vec![
        Line::from(""),
        Line::from(Span::styled(
            "Digital Asset Created Successfully!",
            Style::default().fg(BRAND_GOLD).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            format!(
                "{} ({}) on {}",
                truncate_str(&asset.name, 32),
                truncate_str(&asset.symbol, 12),
                asset.network
            ),
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            asset
                .market_cap
                .as_ref()
                .map(|cap| format!("Market cap {}", cap))
                .unwrap_or_default(),
            Style::default().fg(Color::Gray),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "Your digital asset has been created and is now ready for review. You will receive a notification once it has been approved.",
            Style::default().fg(Color::Gray),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled(
                "[Enter] ",
                Style::default().fg(ACCENT_GOLD).add_modifier(Modifier::BOLD),
            ),
            Span::styled("Go to Dashboard  ", Style::default().fg(Color::White)),
            Span::styled(
                "[Esc] ",
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            ),
            Span::styled("Close", Style::default().fg(Color::White)),
        ]),
    ];

    f.render_widget(Clear, dialog_area);
    let dialog = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(BRAND_GOLD)),
        );
    f.render_widget(dialog, dialog_area);
}

fn fees_label(fees: Fees) -> &'static str {
    match fees {
        Fees::Low => "Low",
        Fees::Medium => "Medium",
        Fees::High => "High",
    }
}

fn speed_label(speed: Speed) -> &'static str {
    match speed {
        Speed::Fast => "Fast",
        Speed::Medium => "Medium",
        Speed::Slow => "Slow",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::onboarding::OnboardingController;
    use ratatui::{Terminal, backend::TestBackend};

    fn draw(view: &StepView) -> String {
        let backend = TestBackend::new(120, 40);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal
            .draw(|f| render_wizard(f, f.area(), view, &WizardInput::new(), 0))
            .unwrap();
        let buffer = terminal.backend().buffer().clone();
        buffer
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect::<String>()
    }

    #[test]
    fn test_progress_dots() {
        assert_eq!(render_progress_dots(2, 4), "● ● ○ ○");
    }

    #[test]
    fn test_first_step_renders_options() {
        let c = OnboardingController::default();
        let screen = draw(&c.view());
        assert!(screen.contains("Equity Digital Assets"));
        assert!(screen.contains("Wallet not connected"));
        assert!(screen.contains("Step 1 of 7"));
    }

    #[test]
    fn test_modal_overlay_renders() {
        let mut c = OnboardingController::default();
        c.dispatch(crate::onboarding::Action::OpenWalletModal);
        let screen = draw(&c.view());
        assert!(screen.contains("Connect Wallet"));
        assert!(screen.contains("MetaMask"));
    }
}
