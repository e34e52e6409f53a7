use crate::AppConfig;
use treeweb_core::tags::{a, body, comment, div, form, h1, h2, head, html, input, label, meta, script, style, title};
use treeweb_core::{Element, Render, Result, attrs, children, declarations, format_float, rulesets};

pub const DOCTYPE: &str = "<!DOCTYPE html>";

/// The whole `index.html` tree.
pub fn build_index_page(config: &AppConfig) -> Result<Element> {
    let link_colors = style(
        attrs! {},
        rulesets! {
            "a:link" => declarations! { "color" => "red" },
            "a:visited" => declarations! { "color" => "green" },
            "a:hover" => declarations! { "color" => "hotpink" },
            "a:active" => declarations! { "color" => "blue" },
        },
    )?;

    let page_head = head(
        attrs! {},
        children![
            meta(attrs! { "charset" => "UTF-8" })?,
            meta(attrs! { "name" => "viewport", "content" => "width=device-width, initial-scale=1" })?,
            title(attrs! {}, config.title.as_str())?,
            link_colors,
            script(
                attrs! { "src" => format!("/{}", config.script_name), "charset" => "UTF-8" },
                children![],
            )?,
        ],
    )?;

    let page_body = body(
        attrs! { "style" => declarations! { "background_color" => "black" } },
        children![make_body(config)?],
    )?;

    html(attrs! { "lang" => "en" }, children![page_head, page_body])
}

/// Header, one readout per state key, and the step size form.
pub fn make_body(config: &AppConfig) -> Result<Element> {
    let banner = h1(
        attrs! { "style" => declarations! { "color" => "yellow" } },
        config.title.as_str(),
    )?;
    let project_link = a(attrs! { "href" => config.project_url.as_str() }, "Source Code on GitHub")?;
    let header = div(
        attrs! { "style" => declarations! { "text_align" => "center" } },
        children![banner, h2(attrs! {}, children![project_link])?],
    )?;

    let mut content = div(attrs! { "id" => "readouts" }, children![header])?;
    content.push(comment("Readout text and color are updated by the client script.")?)?;
    for key in config.state_keys() {
        content.push(div(
            attrs! { "class" => "readout", "data_key" => key },
            "waiting ...",
        )?)?;
    }

    let step_input = label(
        attrs! { "style" => declarations! { "color" => "white" } },
        children![
            "Step Size",
            input(attrs! {
                "id" => "stepinput",
                "type" => "text",
                "value" => format_float(config.stepsize),
                "style" => declarations! { "margin" => "1em" },
            })?,
        ],
    )?;
    let step_submit = input(attrs! { "type" => "submit", "value" => "Submit" })?;
    let step_form = form(
        attrs! { "id" => "setstep" },
        children![div(
            attrs! { "style" => declarations! { "margin" => "20px" } },
            children![step_input, step_submit],
        )?],
    )?;
    content.push(step_form)?;

    Ok(content)
}

/// `<!DOCTYPE html>` followed by the rendered page.
pub fn render_index(config: &AppConfig, indent: Option<usize>) -> Result<String> {
    let page = build_index_page(config)?.render(indent)?;
    if page.starts_with('\n') {
        Ok(format!("{DOCTYPE}{page}"))
    } else {
        Ok(format!("{DOCTYPE}\n{page}"))
    }
}
