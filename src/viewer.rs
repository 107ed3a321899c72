use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::chapters::{self, ChapterLabels, ChapterMap};
use crate::cli::ViewerArgs;
use crate::page::page_file_name;

#[derive(Debug, Clone)]
pub struct ViewerOptions {
    pub title: String,
    pub image_base: String,
    pub labels: ChapterLabels,
}

impl ViewerOptions {
    pub fn from_args(args: &ViewerArgs) -> Self {
        let labels = args
            .labels
            .iter()
            .fold(ChapterLabels::default(), |labels, (number, text)| {
                labels.with_label(*number, text.clone())
            });
        Self {
            title: args.title.clone(),
            image_base: args.image_base.trim_end_matches('/').to_owned(),
            labels,
        }
    }
}

/// What the svg root holds: chapter directories, or loose page files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Layout {
    Chapters(ChapterMap),
    Flat(Vec<u32>),
}

pub fn run(args: ViewerArgs) -> anyhow::Result<()> {
    let svg_dir = PathBuf::from(&args.svg_dir);
    let out_path = PathBuf::from(&args.out);
    let options = ViewerOptions::from_args(&args);

    let layout = detect_layout(&svg_dir)?;
    let html = match &layout {
        Layout::Chapters(map) => render_chapter_viewer(map, &options)?,
        Layout::Flat(pages) => render_flat_viewer(pages, &options),
    };

    if let Some(parent) = out_path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create viewer parent dir: {}", parent.display()))?;
    }
    std::fs::write(&out_path, html)
        .with_context(|| format!("write viewer: {}", out_path.display()))?;

    match layout {
        Layout::Chapters(map) => tracing::info!(
            out = %out_path.display(),
            chapters = map.len(),
            "generated chapter viewer"
        ),
        Layout::Flat(pages) => tracing::info!(
            out = %out_path.display(),
            pages = pages.len(),
            "generated flat viewer"
        ),
    }
    Ok(())
}

pub fn detect_layout(svg_dir: &Path) -> anyhow::Result<Layout> {
    if !svg_dir.is_dir() {
        anyhow::bail!("svg directory not found: {}", svg_dir.display());
    }

    let map = chapters::scan_chapters(svg_dir).context("scan chapter directories")?;
    if !map.is_empty() {
        return Ok(Layout::Chapters(map));
    }

    let pages = chapters::scan_page_numbers(svg_dir).context("scan flat pages")?;
    if pages.is_empty() {
        anyhow::bail!("no page_<n>.svg files found under {}", svg_dir.display());
    }
    tracing::debug!(pages = pages.len(), "no chapter directories; using flat layout");
    Ok(Layout::Flat(pages.into_iter().collect()))
}

pub fn render_chapter_viewer(map: &ChapterMap, options: &ViewerOptions) -> anyhow::Result<String> {
    let data = serde_json::to_string(map).context("serialize chapter map")?;
    let image_base =
        serde_json::to_string(&options.image_base).context("serialize image base")?;

    let mut out = String::new();
    push_document_head(&mut out, &options.title);
    out.push_str("<body>\n");
    out.push_str("    <nav class=\"toolbar\">\n");
    out.push_str("        <label for=\"chapter-select\">Chapter</label>\n");
    out.push_str("        <select id=\"chapter-select\">\n");
    let first = map.first();
    for (chapter, _) in map.iter() {
        let selected = if Some(chapter) == first { " selected" } else { "" };
        out.push_str(&format!(
            "            <option value=\"{}\"{selected}>{}</option>\n",
            html_escape(chapter.as_str()),
            html_escape(&options.labels.label_for(chapter))
        ));
    }
    out.push_str("        </select>\n");
    out.push_str("    </nav>\n");
    out.push_str("    <div class=\"container\" id=\"viewer\"></div>\n");
    out.push_str("    <script>\n");
    out.push_str(&format!("        const chapters = {};\n", script_safe(&data)));
    out.push_str(&format!("        const imageBase = {};\n", script_safe(&image_base)));
    out.push_str(CHAPTER_SCRIPT);
    out.push_str("    </script>\n");
    out.push_str("</body>\n");
    out.push_str("</html>\n");
    Ok(out)
}

pub fn render_flat_viewer(pages: &[u32], options: &ViewerOptions) -> String {
    let mut out = String::new();
    push_document_head(&mut out, &options.title);
    out.push_str("<body>\n");
    out.push_str("    <div class=\"container\">\n");
    for page in pages {
        out.push_str(&format!(
            "        <div class=\"page-wrapper\"><img src=\"{}/{}\" alt=\"Page {page}\" loading=\"lazy\"></div>\n",
            html_escape(&options.image_base),
            page_file_name(*page)
        ));
    }
    out.push_str("    </div>\n");
    out.push_str("</body>\n");
    out.push_str("</html>\n");
    out
}

fn push_document_head(out: &mut String, title: &str) {
    out.push_str("<!DOCTYPE html>\n");
    out.push_str("<html lang=\"en\">\n");
    out.push_str("<head>\n");
    out.push_str("    <meta charset=\"UTF-8\">\n");
    out.push_str(
        "    <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n",
    );
    out.push_str(&format!("    <title>{}</title>\n", html_escape(title)));
    out.push_str(VIEWER_STYLE);
    out.push_str("</head>\n");
}

const VIEWER_STYLE: &str = r#"    <style>
        body {
            background-color: #333;
            margin: 0;
            padding: 0;
            font-family: sans-serif;
            display: flex;
            flex-direction: column;
            align-items: center;
        }
        .toolbar {
            position: sticky;
            top: 0;
            z-index: 1;
            width: 100%;
            padding: 10px;
            box-sizing: border-box;
            background-color: #222;
            color: #eee;
            text-align: center;
        }
        .toolbar select {
            margin-left: 8px;
            font-size: 1rem;
        }
        .container {
            width: 100%;
            max-width: 1000px;
            padding: 20px 10px;
            box-sizing: border-box;
            display: flex;
            flex-direction: column;
            gap: 20px;
        }
        .page-wrapper {
            width: 100%;
            background-color: white;
            box-shadow: 0 4px 6px rgba(0,0,0,0.3);
            border-radius: 4px;
            overflow: hidden;
            position: relative;
        }
        img {
            display: block;
            width: 100%;
            height: auto;
            transform: scale(1.2);
            transform-origin: center center;
        }
    </style>
"#;

// `Date.now()` is evaluated in the browser, so the generated file stays stable.
const CHAPTER_SCRIPT: &str = r#"        const select = document.getElementById('chapter-select');
        const viewer = document.getElementById('viewer');

        function showChapter(chapterId) {
            viewer.replaceChildren();
            const stamp = Date.now();
            for (const page of chapters[chapterId] || []) {
                const wrapper = document.createElement('div');
                wrapper.className = 'page-wrapper';
                const img = document.createElement('img');
                img.src = `${imageBase}/${chapterId}/page_${page}.svg?t=${stamp}`;
                img.alt = `Page ${page}`;
                img.loading = 'lazy';
                wrapper.appendChild(img);
                viewer.appendChild(wrapper);
            }
            window.scrollTo(0, 0);
        }

        select.addEventListener('change', () => showChapter(select.value));
        showChapter(select.value);
"#;

/// Keeps a JSON literal from closing the surrounding `<script>` element.
fn script_safe(json: &str) -> String {
    json.replace("</", "<\\/")
}

fn html_escape(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
