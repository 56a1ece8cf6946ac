// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! HTML rendering of the checker page
//!
//! All user and model text goes through `ammonia::clean_text`.

use ammonia::clean_text;
use base64::{engine::general_purpose::STANDARD, Engine as _};

use super::notice::Notice;
use super::session::UploadedFile;
use super::view::{IdentifiedView, ResultView};
use crate::fish::suggested_cities;

pub const PAGE_TITLE: &str = "UOチェッカー";
pub const SPINNER_TEXT: &str = "魚を識別中...";
const BACKEND_MISSING: &str = "バックエンドが見つかりません。VLM_ENDPOINT を設定してください。";

const STYLE: &str = r#"
body { font-family: sans-serif; max-width: 760px; margin: 0 auto; padding: 1rem; }
h1.title { text-align: center; font-size: clamp(30px, 8vw, 100px); font-weight: bold; white-space: nowrap; }
.wide { width: 100%; padding: 0.6rem; font-size: 1rem; }
.primary { background: #ff4b4b; color: #fff; border: none; border-radius: 6px; }
.uploader { display: flex; flex-direction: column; align-items: center; justify-content: center;
  height: 180px; border: 2px dashed #cccccc; border-radius: 10px; background: #ffffff; cursor: pointer; }
.uploader:hover { background: #f7f7f7; border-color: #aaaaaa; }
.uploader .icon { font-size: 4rem; color: #555; }
.uploader input { display: none; }
.preview { text-align: center; }
.preview img { max-width: 100%; }
.caption { color: #777; font-size: 0.85rem; }
.notice { padding: 0.75rem 1rem; border-radius: 6px; margin: 0.5rem 0; }
.notice-success { background: #e6f4ea; color: #176f2c; }
.notice-info { background: #e8f0fe; color: #1a4fa0; }
.notice-warning { background: #fff8e1; color: #8a6100; }
.notice-error { background: #fdecea; color: #a12622; }
.metrics { display: grid; grid-template-columns: repeat(4, 1fr); gap: 0.5rem; }
.metric .label { font-size: 0.85rem; color: #555; }
.metric .value { font-size: 1.3rem; }
#spinner { display: none; }
@media (max-width: 600px) { .metrics { grid-template-columns: repeat(2, 1fr); } }
"#;

/// Upload shown as an inline preview
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadPreview {
    pub name: String,
    pub data_url: String,
}

impl UploadPreview {
    pub fn from_upload(upload: &UploadedFile) -> Self {
        Self {
            name: upload.name.clone(),
            data_url: format!(
                "data:{};base64,{}",
                upload.info.mime_type(),
                STANDARD.encode(&upload.bytes)
            ),
        }
    }
}

/// Everything needed to render one page
#[derive(Debug, Clone)]
pub struct PageContext<'a> {
    pub flash: &'a [Notice],
    pub upload: Option<UploadPreview>,
    pub uploader_key: u64,
    pub selected_location: &'a str,
    pub result: Option<ResultView>,
    pub backend_available: bool,
}

pub fn render_page(ctx: &PageContext<'_>) -> String {
    let mut html = String::with_capacity(8 * 1024);

    html.push_str("<!DOCTYPE html>\n<html lang=\"ja\">\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str(
        "<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n",
    );
    html.push_str(&format!("<title>{}</title>\n", PAGE_TITLE));
    html.push_str(&format!("<style>{}</style>\n</head>\n<body>\n", STYLE));

    if !ctx.backend_available {
        push_notice(&mut html, &Notice::warning(BACKEND_MISSING));
    }

    html.push_str(&format!("<h1 class=\"title\">{}</h1>\n", PAGE_TITLE));
    html.push_str("<button type=\"button\" class=\"wide\" id=\"settings\">設定</button>\n<hr>\n");

    render_upload(&mut html, ctx);
    html.push_str("<hr>\n");
    render_location_form(&mut html, ctx);

    for notice in ctx.flash {
        push_notice(&mut html, notice);
    }

    if let Some(ref result) = ctx.result {
        render_result(&mut html, result);
    }

    html.push_str(
        "<script>document.getElementById('decide-form').addEventListener('submit', function () {\
         document.getElementById('spinner').style.display = 'block'; });</script>\n",
    );
    html.push_str("</body>\n</html>\n");
    html
}

fn render_upload(html: &mut String, ctx: &PageContext<'_>) {
    match ctx.upload {
        None => {
            html.push_str(&format!(
                "<form method=\"post\" action=\"/upload\" enctype=\"multipart/form-data\" id=\"upload-form-{}\">\n",
                ctx.uploader_key
            ));
            html.push_str(
                "<label class=\"uploader\"><span class=\"icon\">📷</span><span>画像を選択</span>\
                 <input type=\"file\" name=\"file\" accept=\"image/png,image/jpeg\" \
                 onchange=\"this.form.submit()\"></label>\n",
            );
            html.push_str("<noscript><button type=\"submit\" class=\"wide\">アップロード</button></noscript>\n");
            html.push_str("</form>\n");
        }
        Some(ref preview) => {
            html.push_str("<div class=\"preview\">\n");
            html.push_str(&format!(
                "<img src=\"{}\" alt=\"{}\">\n<div class=\"caption\">{}</div>\n",
                preview.data_url,
                clean_text(&preview.name),
                clean_text(&preview.name)
            ));
            html.push_str("</div>\n");
            html.push_str(
                "<form method=\"post\" action=\"/reset\">\
                 <button type=\"submit\" class=\"wide\">別の画像を選択</button></form>\n",
            );
        }
    }
}

fn render_location_form(html: &mut String, ctx: &PageContext<'_>) {
    html.push_str("<form method=\"post\" action=\"/submit\" id=\"decide-form\">\n");
    html.push_str("<label for=\"location\">現在地を入力</label>\n");
    html.push_str("<select name=\"location\" id=\"location\" class=\"wide\">\n<option value=\"\"></option>\n");
    for city in suggested_cities() {
        let selected = if city == ctx.selected_location {
            " selected"
        } else {
            ""
        };
        html.push_str(&format!(
            "<option value=\"{}\"{}>{}</option>\n",
            city, selected, city
        ));
    }
    html.push_str("</select>\n");
    html.push_str("<button type=\"submit\" class=\"wide primary\">決定</button>\n");
    html.push_str(&format!("<div id=\"spinner\">{}</div>\n", SPINNER_TEXT));
    html.push_str("</form>\n");
}

fn render_result(html: &mut String, result: &ResultView) {
    html.push_str("<hr>\n<section id=\"result\">\n<h2>識別結果</h2>\n");
    match result {
        ResultView::Failure { .. } => {
            for notice in result.notices() {
                push_notice(html, notice);
            }
        }
        ResultView::Identified(view) => render_identified(html, view),
    }
    html.push_str("</section>\n");
}

fn render_identified(html: &mut String, view: &IdentifiedView) {
    push_notice(html, &view.cache_notice);

    html.push_str(&format!("<h3>{}</h3>\n", clean_text(&view.heading)));
    if let Some(ref caption) = view.scientific_caption {
        html.push_str(&format!("<div class=\"caption\">{}</div>\n", clean_text(caption)));
    }

    push_notice(html, &view.legal_notice);

    html.push_str("<h3>規制情報</h3>\n<div class=\"metrics\">\n");
    for metric in &view.metrics {
        html.push_str(&format!(
            "<div class=\"metric\"><div class=\"label\">{}</div><div class=\"value\">{}</div></div>\n",
            metric.label,
            clean_text(&metric.value)
        ));
    }
    html.push_str("</div>\n");

    html.push_str("<details>\n<summary>詳細情報を見る</summary>\n");
    for item in &view.details {
        html.push_str(&format!("<p><strong>{}:</strong></p>\n", item.label));
        match item.level {
            Some(level) => push_notice(html, &Notice::new(level, item.text.clone())),
            None => html.push_str(&format!("<p>{}</p>\n", clean_text(&item.text))),
        }
    }
    html.push_str("</details>\n<hr>\n");

    html.push_str(&format!(
        "<div class=\"caption\">{}</div>\n<div class=\"caption\">{}</div>\n",
        clean_text(&view.source_caption),
        clean_text(&view.confidence_caption)
    ));
    if let Some(ref url) = view.source_url {
        html.push_str(&format!(
            "<div class=\"caption\"><a href=\"{}\" rel=\"noopener noreferrer\" target=\"_blank\">公式サイトで確認</a></div>\n",
            clean_text(url)
        ));
    }
}

fn push_notice(html: &mut String, notice: &Notice) {
    html.push_str(&format!(
        "<div class=\"notice {}\">{}</div>\n",
        notice.level.css_class(),
        clean_text(&notice.text)
    ));
}
