use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};
use crate::map_draw::MapView;
use crate::state::{AppState, Panel};

fn draw_list(f: &mut Frame, area: Rect, title: &str, items: &[String], cursor: Option<usize>, chosen: Option<&str>) {
    let items: Vec<ListItem> = items
        .iter()
        .map(|i| {
            let item = ListItem::new(i.clone());
            if chosen == Some(i.as_str()) {
                item.style(Style::default().fg(Color::Green))
            } else {
                item
            }
        })
        .collect();
    let mut list_state = ListState::default();
    list_state.select(cursor);
    let border = if cursor.is_some() { Color::Yellow } else { Color::White };
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title).border_style(Style::default().fg(border)))
        .highlight_symbol(">> ")
        .highlight_style(Style::default().fg(Color::Red));
    f.render_stateful_widget(list, area, &mut list_state);
}

pub fn draw(f: &mut Frame, state: &AppState) {
    let model = state.session.render_model();
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(25),
            Constraint::Percentage(55),
            Constraint::Percentage(20),
        ].as_ref())
        .split(f.area());

    // Left: the cascade, one list per level
    let lists = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(7),
            Constraint::Percentage(40),
            Constraint::Min(5),
        ].as_ref())
        .split(chunks[0]);
    let focus = |panel: Panel| (state.active_panel == panel).then(|| state.cursor(panel));
    draw_list(f, lists[0], "Postnummer", &model.zipcode_options, focus(Panel::Zipcode), model.zipcode.as_deref());
    draw_list(f, lists[1], "Vej", &model.road_options, focus(Panel::Road), model.road.as_deref());
    draw_list(f, lists[2], "Adresse", &model.address_options, focus(Panel::Address), model.address.as_deref());

    // Center: map
    let title = model
        .road
        .as_deref()
        .or(model.zipcode.as_deref())
        .unwrap_or("Aarhus");
    MapView::new(&model.points, model.bounds).render(f, chunks[1], title, model.address.as_deref());

    // Right: selection, prediction, status
    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(40),
            Constraint::Percentage(20),
            Constraint::Percentage(40),
        ].as_ref())
        .split(chunks[2]);

    let dash = "–";
    let info_text = format!(
        "Postnummer: {}\nVej: {}\nAdresse: {}\nAdresser på kort: {}",
        model.zipcode.as_deref().unwrap_or(dash),
        model.road.as_deref().unwrap_or(dash),
        model.address.as_deref().unwrap_or(dash),
        model.points.len(),
    );
    let info_paragraph = Paragraph::new(info_text)
        .block(Block::default().borders(Borders::ALL).title("Valg"))
        .wrap(Wrap { trim: true });
    f.render_widget(info_paragraph, right[0]);

    let prediction_text = match (&model.prediction, &model.address) {
        (Some(price), _) => price.clone(),
        (None, Some(_)) if model.loading => "Henter…".to_string(),
        (None, Some(_)) => "Ingen forudsigelse".to_string(),
        (None, None) => "Vælg en adresse".to_string(),
    };
    let prediction_paragraph = Paragraph::new(prediction_text)
        .block(Block::default().borders(Borders::ALL).title("Forventet pris"))
        .style(Style::default().fg(Color::White))
        .wrap(Wrap { trim: true });
    f.render_widget(prediction_paragraph, right[1]);

    let status = if model.loading { format!("Henter…\n{}", state.status) } else { state.status.clone() };
    let status_paragraph = Paragraph::new(format!("{status}\n\n{}", AppState::HELP_TEXT))
        .block(Block::default().borders(Borders::ALL).title("Status"))
        .wrap(Wrap { trim: true });
    f.render_widget(status_paragraph, right[2]);
}
