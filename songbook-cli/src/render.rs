//! Plain-text rendering of table pages and detail views.

use std::collections::BTreeMap;

use songbook_lib::api::SearchResults;
use songbook_lib::model::Author;
use songbook_lib::model::Song;
use songbook_lib::model::StaticPage;
use songbook_lib::pages::authors::NameOrder;
use songbook_lib::pages::authors::songs_by_author_filter;
use songbook_table::Order;
use songbook_table::column::Alignment;
use songbook_table::surface::HeaderCell;
use songbook_table::url_sync::to_param;
use unicode_width::UnicodeWidthChar;
use unicode_width::UnicodeWidthStr;

/// Widest a column may get before its cells are truncated.
pub const MAX_COLUMN_WIDTH: usize = 40;

const SEPARATOR: &str = " | ";
const ELLIPSIS: char = '…';

/// Everything printed for one page.
#[derive(Debug, Clone, Default)]
pub struct PageView {
    pub title: Option<String>,
    pub header: Vec<HeaderCell>,
    pub rows: Vec<Vec<String>>,
    pub no_data_text: String,
    pub displayed_rows: String,
    pub entries_found: String,
    pub filter_param: Option<String>,
}

fn header_label(cell: &HeaderCell) -> String {
    match cell.sort_direction {
        Some(Order::Asc) => format!("{} ▲", cell.label),
        Some(Order::Desc) => format!("{} ▼", cell.label),
        None => cell.label.clone(),
    }
}

/// Shortens `text` to at most `width` display columns.
pub fn truncate(text: &str, width: usize) -> String {
    if text.width() <= width {
        return text.to_string();
    }
    if width == 0 {
        return String::new();
    }

    let mut out = String::new();
    let mut used = 0;
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > width - 1 {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push(ELLIPSIS);
    out
}

/// Pads `text` to `width` display columns.
pub fn pad(text: &str, width: usize, align: Alignment) -> String {
    let fill = width.saturating_sub(text.width());
    match align {
        Alignment::Left => format!("{}{}", text, " ".repeat(fill)),
        Alignment::Right => format!("{}{}", " ".repeat(fill), text),
        Alignment::Center => {
            let left = fill / 2;
            format!("{}{}{}", " ".repeat(left), text, " ".repeat(fill - left))
        }
    }
}

/// Cells are flattened to a single line.
fn single_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn column_widths(labels: &[String], rows: &[Vec<String>]) -> Vec<usize> {
    labels
        .iter()
        .enumerate()
        .map(|(i, label)| {
            rows.iter()
                .filter_map(|row| row.get(i))
                .map(|cell| cell.width())
                .chain(std::iter::once(label.width()))
                .max()
                .unwrap_or(0)
                .min(MAX_COLUMN_WIDTH)
        })
        .collect()
}

fn render_line(cells: &[String], widths: &[usize], header: &[HeaderCell]) -> String {
    let line = widths
        .iter()
        .zip(header)
        .enumerate()
        .map(|(i, (&width, cell))| {
            let text = cells.get(i).map(String::as_str).unwrap_or("");
            pad(&truncate(text, width), width, cell.align)
        })
        .collect::<Vec<_>>()
        .join(SEPARATOR);
    line.trim_end().to_string()
}

/// Renders the page as a text grid followed by the pagination caption and
/// the shareable filter parameter.
pub fn render_page(view: &PageView) -> String {
    let mut out = Vec::new();
    if let Some(title) = &view.title {
        out.push(title.clone());
        out.push(String::new());
    }

    let labels: Vec<String> = view.header.iter().map(header_label).collect();
    let rows: Vec<Vec<String>> = view
        .rows
        .iter()
        .map(|row| row.iter().map(|cell| single_line(cell)).collect())
        .collect();
    let widths = column_widths(&labels, &rows);

    out.push(render_line(&labels, &widths, &view.header));
    out.push(
        widths
            .iter()
            .map(|&w| "-".repeat(w))
            .collect::<Vec<_>>()
            .join("-+-"),
    );

    if rows.is_empty() {
        out.push(view.no_data_text.clone());
    } else {
        out.extend(rows.iter().map(|row| render_line(row, &widths, &view.header)));
    }

    out.push(String::new());
    out.push(format!("{} ({})", view.displayed_rows, view.entries_found));
    if let Some(param) = &view.filter_param {
        out.push(format!("filter={}", param));
    }
    out.join("\n")
}

fn underlined(title: &str) -> [String; 2] {
    [title.to_string(), "=".repeat(title.width().max(1))]
}

/// Command that lists one author's songs through the song table's filter.
pub fn author_songs_command(author_id: i64) -> String {
    match to_param(&songs_by_author_filter(author_id)) {
        Some(param) => format!("songbook songs --filter '{}'", param),
        None => "songbook songs".to_string(),
    }
}

fn author_label(author: &Author, order: NameOrder) -> String {
    let name = match (order, author.first_name.as_deref()) {
        (NameOrder::LastName, Some(first)) if !first.is_empty() => format!("{}, {}", author.name, first),
        _ => author.full_name(),
    };
    match author.songs_count {
        Some(1) => format!("{} (1 song)", name),
        Some(n) => format!("{} ({} songs)", name, n),
        None => name,
    }
}

/// Renders one song: title, credits, asset links and the lyrics as text.
pub fn render_song(song: &Song, asset_url: impl Fn(&str) -> String) -> String {
    let mut out = Vec::from(underlined(&song.title));
    for author in song.authors() {
        out.push(format!("Author: {}  [{}]", author.full_name(), author_songs_command(author.id)));
    }
    let genres: Vec<&str> = song.genres().map(|genre| genre.name.as_str()).collect();
    if !genres.is_empty() {
        out.push(format!("Genres: {}", genres.join(", ")));
    }
    for (label, file) in [("PDF", &song.pdf), ("Audio", &song.audio), ("Preview", &song.preview_image)] {
        if let Some(file) = file {
            out.push(format!("{}: {}", label, asset_url(file)));
        }
    }

    let text = song.plain_text();
    if !text.is_empty() {
        out.push(String::new());
        out.push(text);
    }
    out.join("\n")
}

pub fn render_static_page(page: &StaticPage) -> String {
    let mut out = Vec::from(underlined(&page.title));
    let content = page.plain_content();
    if !content.is_empty() {
        out.push(String::new());
        out.push(content);
    }
    out.join("\n")
}

/// One line per page, id first so it can be passed to `songbook page`.
pub fn render_static_page_list(pages: &[StaticPage]) -> String {
    if pages.is_empty() {
        return "No pages".to_string();
    }
    let width = pages.iter().map(|page| page.id.to_string().width()).max().unwrap_or(0);
    pages
        .iter()
        .map(|page| format!("{}  {}", pad(&page.id.to_string(), width, Alignment::Right), page.title))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Authors under their initial, each followed by the command listing
/// their songs.
pub fn render_grouped_authors(groups: &BTreeMap<char, Vec<&Author>>, order: NameOrder) -> String {
    if groups.is_empty() {
        return "No authors".to_string();
    }
    let labels: Vec<(String, i64)> = groups
        .values()
        .flatten()
        .map(|author| (author_label(author, order), author.id))
        .collect();
    let width = labels
        .iter()
        .map(|(label, _)| label.width())
        .max()
        .unwrap_or(0)
        .min(MAX_COLUMN_WIDTH);

    let mut labels = labels.into_iter();
    let mut out = Vec::new();
    for (initial, authors) in groups {
        if !out.is_empty() {
            out.push(String::new());
        }
        out.push(initial.to_string());
        for (label, id) in labels.by_ref().take(authors.len()) {
            out.push(format!(
                "  {}  {}",
                pad(&truncate(&label, width), width, Alignment::Left),
                author_songs_command(id)
            ));
        }
    }
    out.join("\n")
}

/// Search hits grouped by collection; empty groups are left out.
pub fn render_search(term: &str, results: &SearchResults) -> String {
    if results.is_empty() {
        return format!("Nothing found for \"{}\"", term.trim());
    }

    let mut sections: Vec<(&str, Vec<(String, String)>)> = Vec::new();
    sections.push((
        "Songs",
        results
            .songs
            .iter()
            .map(|song| (song.title.clone(), format!("songbook song {}", song.id)))
            .collect(),
    ));
    sections.push((
        "Authors",
        results
            .authors
            .iter()
            .map(|author| (author.full_name(), format!("songbook songs --author {}", author.id)))
            .collect(),
    ));
    sections.push((
        "Genres",
        results
            .genres
            .iter()
            .map(|genre| (genre.name.clone(), format!("songbook songs --genre {}", genre.id)))
            .collect(),
    ));

    let mut out = Vec::new();
    for (heading, hits) in sections.into_iter().filter(|(_, hits)| !hits.is_empty()) {
        if !out.is_empty() {
            out.push(String::new());
        }
        out.push(format!("{} ({})", heading, hits.len()));
        let width = hits
            .iter()
            .map(|(label, _)| label.width())
            .max()
            .unwrap_or(0)
            .min(MAX_COLUMN_WIDTH);
        for (label, command) in hits {
            out.push(format!(
                "  {}  {}",
                pad(&truncate(&label, width), width, Alignment::Left),
                command
            ));
        }
    }
    out.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(id: &str, label: &str, align: Alignment, sort: Option<Order>) -> HeaderCell {
        HeaderCell {
            column_id: id.to_string(),
            label: label.to_string(),
            align,
            sortable: sort.is_some(),
            sort_direction: sort,
            disable_padding: false,
            min_width: None,
            max_width: None,
        }
    }

    fn song(value: serde_json::Value) -> Song {
        serde_json::from_value(value).unwrap()
    }

    fn author(id: i64, first_name: Option<&str>, name: &str, songs: Option<u64>) -> Author {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "name": name,
            "first_name": first_name,
            "songs_count": songs,
        }))
        .unwrap()
    }

    #[test]
    fn test_author_songs_command() {
        assert_eq!(author_songs_command(4), r#"songbook songs --filter '{"authors":[4]}'"#);
    }

    #[test]
    fn test_render_song() {
        let song = song(serde_json::json!({
            "id": "s-1",
            "title": "Amazing Grace",
            "text": "<p>Amazing grace, how sweet the sound</p>",
            "pdf": "f-1",
            "audio": null,
            "authors": [{"id": 1, "authors_id": {"id": 4, "name": "Newton", "first_name": "John"}}],
            "genres": [
                {"id": 1, "genres_id": {"id": 9, "name": "Hymn"}},
                {"id": 2, "genres_id": {"id": 3, "name": "Gospel"}}
            ]
        }));

        let rendered = render_song(&song, |file| format!("https://cms.example.org/assets/{}", file));
        let expected = [
            "Amazing Grace",
            "=============",
            r#"Author: John Newton  [songbook songs --filter '{"authors":[4]}']"#,
            "Genres: Hymn, Gospel",
            "PDF: https://cms.example.org/assets/f-1",
            "",
            "Amazing grace, how sweet the sound",
        ]
        .join("\n");
        assert_eq!(rendered, expected);
    }

    #[test]
    fn test_render_song_without_extras() {
        let song = song(serde_json::json!({"id": "s-2", "title": "Hum"}));
        assert_eq!(render_song(&song, |file| file.to_string()), "Hum\n===");
    }

    #[test]
    fn test_render_static_page_list() {
        let pages: Vec<StaticPage> = serde_json::from_value(serde_json::json!([
            {"id": 3, "title": "About"},
            {"id": 12, "title": "Imprint"}
        ]))
        .unwrap();
        assert_eq!(render_static_page_list(&pages), " 3  About\n12  Imprint");
        assert_eq!(render_static_page_list(&[]), "No pages");
    }

    #[test]
    fn test_render_grouped_authors() {
        let authors = vec![
            author(4, Some("John"), "Newton", Some(12)),
            author(2, Some("Fanny"), "Crosby", Some(1)),
            author(7, None, "Nordic", None),
        ];
        let groups = songbook_lib::pages::authors::group_by_initial(&authors, NameOrder::LastName);

        let expected = [
            "C",
            r#"  Crosby, Fanny (1 song)   songbook songs --filter '{"authors":[2]}'"#,
            "",
            "N",
            r#"  Newton, John (12 songs)  songbook songs --filter '{"authors":[4]}'"#,
            r#"  Nordic                   songbook songs --filter '{"authors":[7]}'"#,
        ]
        .join("\n");
        assert_eq!(render_grouped_authors(&groups, NameOrder::LastName), expected);
    }

    #[test]
    fn test_render_search() {
        let results = SearchResults {
            songs: vec![song(serde_json::json!({"id": "s-1", "title": "Amazing Grace"}))],
            authors: Vec::new(),
            genres: serde_json::from_value(serde_json::json!([{"id": 9, "name": "Hymn"}])).unwrap(),
        };
        let expected = [
            "Songs (1)",
            "  Amazing Grace  songbook song s-1",
            "",
            "Genres (1)",
            "  Hymn  songbook songs --genre 9",
        ]
        .join("\n");
        assert_eq!(render_search("grace", &results), expected);
        assert_eq!(
            render_search(" zzz ", &SearchResults::default()),
            "Nothing found for \"zzz\""
        );
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("Amazing Grace", 20), "Amazing Grace");
        assert_eq!(truncate("Amazing Grace", 8), "Amazing…");
        assert_eq!(truncate("Amazing", 0), "");
        assert_eq!(truncate("日本語の歌", 5), "日本…");
    }

    #[test]
    fn test_pad() {
        assert_eq!(pad("ab", 5, Alignment::Left), "ab   ");
        assert_eq!(pad("ab", 5, Alignment::Right), "   ab");
        assert_eq!(pad("ab", 5, Alignment::Center), " ab  ");
        assert_eq!(pad("abcdef", 3, Alignment::Left), "abcdef");
    }

    #[test]
    fn test_render_page() {
        let view = PageView {
            title: None,
            header: vec![
                cell("title", "Title", Alignment::Left, Some(Order::Asc)),
                cell("songs", "Songs", Alignment::Right, None),
            ],
            rows: vec![
                vec!["Wind".to_string(), "3".to_string()],
                vec!["Morning\nhas broken".to_string(), "12".to_string()],
            ],
            no_data_text: "No data".to_string(),
            displayed_rows: "1-2 of 2".to_string(),
            entries_found: "2 entries found".to_string(),
            filter_param: Some(r#"{"pdf":true}"#.to_string()),
        };

        let expected = [
            "Title ▲            | Songs",
            "-------------------+------",
            "Wind               |     3",
            "Morning has broken |    12",
            "",
            "1-2 of 2 (2 entries found)",
            r#"filter={"pdf":true}"#,
        ]
        .join("\n");
        assert_eq!(render_page(&view), expected);
    }

    #[test]
    fn test_render_empty_page() {
        let view = PageView {
            title: Some("Genres".to_string()),
            header: vec![cell("name", "Name", Alignment::Left, None)],
            rows: Vec::new(),
            no_data_text: "No genres".to_string(),
            displayed_rows: "0-0 of 0".to_string(),
            entries_found: "0 entries found".to_string(),
            filter_param: None,
        };

        let rendered = render_page(&view);
        assert!(rendered.starts_with("Genres\n\nName\n----\nNo genres\n"));
        assert!(rendered.ends_with("0-0 of 0 (0 entries found)"));
    }
}
