use super::theme::OneDark;
use riqi_core::{ParseResult, render};
use termimad::{MadSkin, crossterm::style::Stylize};

#[derive(Clone)]
pub struct RenderOptions {
    pub date_format: String,
    pub time_format: String,
    pub use_color: bool,
    pub short_mode: bool,
}

pub struct Renderer {
    skin: MadSkin,
    opts: RenderOptions,
}

impl Renderer {
    pub fn new(opts: RenderOptions) -> Self {
        Self {
            skin: OneDark::skin(),
            opts,
        }
    }

    pub fn print_md(&self, md: &str) {
        self.skin.print_text(md);
    }

    pub fn print_result(&self, result: &ParseResult) {
        if self.opts.short_mode {
            self.print_result_line(result);
        } else {
            self.print_result_block(result);
        }
    }

    fn print_result_line(&self, result: &ParseResult) {
        if !self.opts.use_color {
            println!(
                "{}",
                render::format_result_line(result, &self.opts.date_format, &self.opts.time_format)
            );
            return;
        }
        let date = render::format_date(result.date, &self.opts.date_format);
        let time = render::format_time(result.time, &self.opts.time_format);
        let priority = format!("[{}]", result.priority);
        println!(
            "{} {} {} {}",
            date.with(OneDark::CYAN),
            time.with(OneDark::BLUE),
            priority.with(OneDark::priority(result.priority)),
            result.title.as_str().with(OneDark::YELLOW),
        );
    }

    fn print_result_block(&self, result: &ParseResult) {
        let block =
            render::format_result_block(result, &self.opts.date_format, &self.opts.time_format);
        if !self.opts.use_color {
            print!("{block}");
            return;
        }
        let md: String = block
            .lines()
            .filter_map(|line| line.split_once(':'))
            .map(|(label, value)| format!("**{label}:** {}\n", value.trim()))
            .collect();
        self.print_md(&md);
    }
}
