use iced::widget::image::Handle;
use iced::widget::{button, column, container, horizontal_space, row, text, Image};
use iced::{Alignment, ContentFit, Element, Length};

use crate::state::photo::{PhotoImage, PhotoScreen};
use crate::Message;

/// Toolbar with back and share actions over the full-size photo
pub fn view(screen: &PhotoScreen) -> Element<'_, Message> {
    let size = match screen.image() {
        PhotoImage::Ready { width, height, .. } => format!("{} × {}", width, height),
        PhotoImage::Decoding | PhotoImage::Blank => String::new(),
    };

    let toolbar = row![
        button("Back").on_press(Message::Back).padding(10),
        text(screen.photo_path().file_name()).size(16),
        text(size).size(14),
        horizontal_space(),
        button("Share").on_press(Message::SharePhoto).padding(10),
    ]
    .spacing(12)
    .padding(8)
    .align_y(Alignment::Center);

    let body: Element<Message> = match screen.image() {
        PhotoImage::Ready { handle, .. } => Image::<Handle>::new(handle.clone())
            .width(Length::Fill)
            .height(Length::Fill)
            .content_fit(ContentFit::Contain)
            .into(),
        PhotoImage::Decoding => centered("Loading…"),
        PhotoImage::Blank => centered("This photo could not be displayed."),
    };

    column![toolbar, body].into()
}

fn centered(label: &str) -> Element<'_, Message> {
    container(text(label).size(16))
        .width(Length::Fill)
        .height(Length::Fill)
        .center_x(Length::Fill)
        .center_y(Length::Fill)
        .into()
}
