#![windows_subsystem = "windows"]

use std::cell::RefCell;
use std::env;
use std::error::Error;
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::{mpsc, Arc};
use std::thread::JoinHandle;

use fltk::{
    app, browser, button, dialog, enums, frame, misc, prelude::*, window
};

use pdf2word_client::{collector, common, config, controller, converter, error, incl_gettext_files, logging, worker};
use pdf2word_l10n as l10n;

const WIDGET_GAP: i32 = 10;
const WINDOW_WIDTH: i32 = 600;
const WINDOW_HEIGHT: i32 = 450;
const BUTTON_HEIGHT: i32 = 30;
const START_BUTTON_HEIGHT: i32 = 40;

const COLOR_BUTTON: enums::Color       = enums::Color::from_rgb(0, 123, 255);
const COLOR_BUTTON_CLEAR: enums::Color = enums::Color::from_rgb(220, 53, 69);
const COLOR_BUTTON_START: enums::Color = enums::Color::from_rgb(40, 167, 69);

#[derive(Clone)]
struct GuiEventSender {
    tx: mpsc::Sender<common::AppEvent>
}

impl common::EventSender for GuiEventSender {
    fn send(&self, evt: common::AppEvent) -> Result<(), mpsc::SendError<common::AppEvent>> {
        let ret = self.tx.send(evt);
        app::awake();
        ret
    }

    fn clone_box(&self) -> Box<dyn common::EventSender> {
        Box::new(self.clone())
    }
}

#[derive(Clone)]
struct Widgets {
    wind: window::Window,
    add_file_button: button::Button,
    add_folder_button: button::Button,
    clear_button: button::Button,
    start_button: button::Button,
    filelist: browser::HoldBrowser,
    progressbar: misc::Progress,
    status: frame::Frame,
}

impl Widgets {
    fn sync(&mut self, ctl: &controller::UiController) {
        let controls = ctl.controls();

        toggle(&mut self.add_file_button, controls.add_files);
        toggle(&mut self.add_folder_button, controls.add_folder);
        toggle(&mut self.clear_button, controls.clear);
        toggle(&mut self.start_button, controls.start);

        if self.filelist.size() as usize != ctl.entries().len() {
            self.filelist.clear();

            for entry in ctl.entries() {
                self.filelist.add(&entry.display().to_string());
            }
        }

        let percent = ctl.progress();
        self.progressbar.set_value(percent as f64);
        self.progressbar.set_label(&format!("{}%", percent));
        self.status.set_label(ctl.status());

        self.wind.redraw();
    }

    fn alert(&self, msg: &str) {
        dialog::alert(self.wind.x() + WIDGET_GAP, self.wind.y() + self.wind.h() / 2, msg);
    }

    fn message(&self, msg: &str) {
        dialog::message(self.wind.x() + WIDGET_GAP, self.wind.y() + self.wind.h() / 2, msg);
    }
}

fn toggle<W: WidgetExt>(wid: &mut W, enabled: bool) {
    if enabled && !wid.active() {
        wid.activate();
    } else if !enabled && wid.active() {
        wid.deactivate();
    }
}

fn styled_button(x: i32, y: i32, w: i32, h: i32, label: &str, color: enums::Color) -> button::Button {
    let mut b = button::Button::default()
        .with_pos(x, y)
        .with_size(w, h)
        .with_label(label);
    b.set_color(color);
    b.set_label_color(enums::Color::White);
    b.set_selection_color(color.darker());
    b.clear_visible_focus();
    b
}

fn main() -> Result<(), Box<dyn Error>> {
    l10n::load_translations(incl_gettext_files!("en", "zh"));
    logging::init_logging();

    let app_config: config::AppConfig = config::load_config();
    let trans = l10n::new_translations(app_config.resolve_locale());

    let app = app::App::default().with_scheme(app::Scheme::Gleam);
    let (tx, rx) = mpsc::channel::<common::AppEvent>();

    let ctl = Rc::new(RefCell::new(controller::UiController::new(trans.clone())));
    let worker_handle: Rc<RefCell<Option<JoinHandle<worker::BatchReport>>>> = Rc::new(RefCell::new(None));

    let wind_title = trans.gettext("PDF to Word");
    let mut wind = window::Window::default()
        .with_size(WINDOW_WIDTH, WINDOW_HEIGHT)
        .center_screen()
        .with_label(&wind_title);
    wind.set_xclass("pdf2word");

    let top_button_width = (WINDOW_WIDTH - 4 * WIDGET_GAP) / 3;
    let add_file_button = styled_button(WIDGET_GAP, WIDGET_GAP, top_button_width, BUTTON_HEIGHT,
                                        &trans.gettext("Select files"), COLOR_BUTTON);
    let add_folder_button = styled_button(2 * WIDGET_GAP + top_button_width, WIDGET_GAP, top_button_width, BUTTON_HEIGHT,
                                          &trans.gettext("Select folder"), COLOR_BUTTON);
    let clear_button = styled_button(3 * WIDGET_GAP + 2 * top_button_width, WIDGET_GAP, top_button_width, BUTTON_HEIGHT,
                                     &trans.gettext("Clear list"), COLOR_BUTTON_CLEAR);

    let list_y = 2 * WIDGET_GAP + BUTTON_HEIGHT;
    let list_height = WINDOW_HEIGHT - list_y - START_BUTTON_HEIGHT - 2 * BUTTON_HEIGHT - 4 * WIDGET_GAP;
    let mut filelist = browser::HoldBrowser::default()
        .with_pos(WIDGET_GAP, list_y)
        .with_size(WINDOW_WIDTH - 2 * WIDGET_GAP, list_height);
    filelist.set_tooltip(&trans.gettext("Drag PDF files here, or use the buttons above..."));
    filelist.set_frame(enums::FrameType::BorderBox);

    let mut progressbar = misc::Progress::default()
        .with_pos(WIDGET_GAP, list_y + list_height + WIDGET_GAP)
        .with_size(WINDOW_WIDTH - 2 * WIDGET_GAP, BUTTON_HEIGHT - 6)
        .with_label("0%");
    progressbar.set_minimum(0.0);
    progressbar.set_maximum(100.0);
    progressbar.set_selection_color(COLOR_BUTTON_START);

    let status = frame::Frame::default()
        .with_pos(WIDGET_GAP, list_y + list_height + WIDGET_GAP + BUTTON_HEIGHT)
        .with_size(WINDOW_WIDTH - 2 * WIDGET_GAP, BUTTON_HEIGHT)
        .with_align(enums::Align::Center | enums::Align::Inside);

    let mut start_button = styled_button(WIDGET_GAP, WINDOW_HEIGHT - START_BUTTON_HEIGHT - WIDGET_GAP,
                                         WINDOW_WIDTH - 2 * WIDGET_GAP, START_BUTTON_HEIGHT,
                                         &trans.gettext("Start conversion"), COLOR_BUTTON_START);
    start_button.set_label_size(14);
    start_button.set_label_font(enums::Font::HelveticaBold);

    wind.end();
    wind.make_resizable(true);

    let mut widgets = Widgets {
        wind: wind.clone(),
        add_file_button,
        add_folder_button,
        clear_button,
        start_button,
        filelist,
        progressbar,
        status,
    };

    widgets.add_file_button.set_callback({
        let ctl = ctl.clone();
        let mut widgets_ref = widgets.clone();
        let dialog_title = trans.gettext("Select PDF files");

        move |_| {
            let mut selectfiles_dialog = dialog::FileDialog::new(dialog::FileDialogType::BrowseMultiFile);
            selectfiles_dialog.set_title(&dialog_title);
            selectfiles_dialog.set_filter("PDF Files\t*.{pdf,PDF}");
            selectfiles_dialog.show();

            if let Err(ex) = ctl.borrow_mut().add_selected(selectfiles_dialog.filenames()) {
                widgets_ref.alert(&ex.to_string());
            }

            widgets_ref.sync(&ctl.borrow());
        }
    });

    widgets.add_folder_button.set_callback({
        let ctl = ctl.clone();
        let mut widgets_ref = widgets.clone();
        let dialog_title = trans.gettext("Select folder");

        move |_| {
            let mut selectfolder_dialog = dialog::FileDialog::new(dialog::FileDialogType::BrowseDir);
            selectfolder_dialog.set_title(&dialog_title);
            selectfolder_dialog.show();

            let folder = selectfolder_dialog.filename();

            if folder.as_os_str().is_empty() {
                return;
            }

            if let Err(ex) = ctl.borrow_mut().add_folder(&folder) {
                widgets_ref.alert(&ex.to_string());
            }

            widgets_ref.sync(&ctl.borrow());
        }
    });

    widgets.clear_button.set_callback({
        let ctl = ctl.clone();
        let mut widgets_ref = widgets.clone();

        move |_| {
            if let Err(ex) = ctl.borrow_mut().clear() {
                widgets_ref.alert(&ex.to_string());
            }

            widgets_ref.sync(&ctl.borrow());
        }
    });

    widgets.start_button.set_callback({
        let ctl = ctl.clone();
        let worker_handle = worker_handle.clone();
        let mut widgets_ref = widgets.clone();
        let trans_ref = trans.clone();
        let app_config = app_config.clone();

        move |_| {
            if ctl.borrow().entries().is_empty() {
                widgets_ref.alert(&trans_ref.gettext("Please add PDF files first!"));
                return;
            }

            let converter_exe = match converter::locate_converter(app_config.converter_path.as_deref()) {
                Ok(exe) => exe,
                Err(ex) => {
                    widgets_ref.alert(&ex.to_string());
                    return;
                }
            };

            let batch_worker = worker::BatchWorker::new(
                Arc::new(converter::Pdf2DocxCommand::new(converter_exe)),
                app_config.page_range(),
                trans_ref.clone(),
            );

            let eventer: Box<dyn common::EventSender> = Box::new(GuiEventSender { tx: tx.clone() });
            let ret = ctl.borrow_mut().start_conversion(batch_worker, eventer);

            match ret {
                Ok(handle) => {
                    worker_handle.replace(Some(handle));
                },
                Err(error::Failure::InvalidInput(msg)) => widgets_ref.alert(&msg),
                Err(ex) => widgets_ref.alert(&ex.to_string()),
            }

            widgets_ref.sync(&ctl.borrow());
        }
    });

    wind.handle({
        let ctl = ctl.clone();
        let mut widgets_ref = widgets.clone();
        let mut dnd = false;
        let mut released = false;

        move |_, ev| match ev {
            enums::Event::DndEnter => {
                dnd = ctl.borrow().controls().accepts_drops;
                released = false;
                dnd
            },
            enums::Event::DndDrag => dnd,
            enums::Event::DndLeave => {
                dnd = false;
                true
            },
            enums::Event::DndRelease => {
                released = true;
                dnd
            },
            enums::Event::Paste => {
                if dnd && released {
                    dnd = false;
                    released = false;

                    let paths = collector::FileCollector::parse_drop_payload(&app::event_text());

                    if ctl.borrow_mut().add_dropped(paths) {
                        widgets_ref.sync(&ctl.borrow());
                    }

                    true
                } else {
                    false
                }
            },
            _ => false,
        }
    });

    wind.set_callback({
        let ctl = ctl.clone();
        let trans_ref = trans.clone();

        move |wid| {
            if app::event() == enums::Event::Close || app::event_key() != enums::Key::Escape {
                let mut close_window = true;

                if ctl.borrow().state().is_converting() {
                    if let Some(choice) = dialog::choice2(wid.x(),
                                                          wid.y() + wid.h() / 2,
                                                          &trans_ref.gettext("A conversion is running. Really close?"),
                                                          &trans_ref.gettext("No"),
                                                          &trans_ref.gettext("Yes"),
                                                          "") {
                        if choice == 0 {
                            close_window = false;
                        }
                    }
                }

                if close_window {
                    wid.hide();
                }
            }
        }
    });

    let args: Vec<PathBuf> = env::args().skip(1).map(PathBuf::from).collect();

    if !args.is_empty() {
        ctl.borrow_mut().add_dropped(args);
    }

    widgets.sync(&ctl.borrow());
    wind.show();

    while app.wait() {
        while let Ok(app_event) = rx.try_recv() {
            let ended = matches!(app_event, common::AppEvent::AllConversionEnded(_));
            ctl.borrow_mut().handle_event(app_event);
            widgets.sync(&ctl.borrow());

            if ended {
                if let Some(handle) = worker_handle.borrow_mut().take() {
                    if handle.join().is_err() {
                        tracing::warn!("Conversion thread panicked");
                    }
                }

                let completion_message = ctl.borrow_mut().take_completion_message();

                if let Some(msg) = completion_message {
                    widgets.message(&msg);
                }
            }
        }
    }

    Ok(())
}
