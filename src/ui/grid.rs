/// Grid adapter
///
/// Binds the gallery's photo list to grid cells. Each cell owns its decoded
/// thumbnail; the list itself stays with the gallery. Cells are index-aligned
/// with the list, so an append only touches the new last cell.
use iced::widget::image::Handle;
use iced::widget::{button, container, scrollable, text, Column, Image, Row};
use iced::{ContentFit, Element, Length};

use super::layout;
use crate::media::DecodedImage;
use crate::state::data::PhotoPath;
use crate::Message;

/// Gap between cells, in pixels
const SPACING: u16 = 4;

#[derive(Debug, Clone)]
pub enum Thumbnail {
    Loading,
    Ready(Handle),
    /// The file could not be decoded
    Missing,
}

#[derive(Debug, Clone)]
pub struct GridCell {
    pub path: PhotoPath,
    pub thumbnail: Thumbnail,
}

#[derive(Debug, Clone)]
pub struct GridAdapter {
    cells: Vec<GridCell>,
    item_width: u32,
    columns: u32,
}

impl GridAdapter {
    pub fn new(item_width: u32, columns: u32) -> Self {
        GridAdapter {
            cells: Vec::new(),
            item_width,
            columns: columns.max(1),
        }
    }

    /// Bind the whole list. Returns the paths whose thumbnails need decoding.
    pub fn bind(&mut self, photos: &[PhotoPath]) -> Vec<PhotoPath> {
        self.cells = photos
            .iter()
            .map(|path| GridCell {
                path: path.clone(),
                thumbnail: Thumbnail::Loading,
            })
            .collect();
        photos.to_vec()
    }

    /// One item was inserted at `index`. Only that cell is created; the
    /// others keep their thumbnails. Returns the path to decode.
    pub fn notify_item_inserted(&mut self, index: usize, photos: &[PhotoPath]) -> Option<PhotoPath> {
        let path = photos.get(index)?.clone();
        let index = index.min(self.cells.len());
        self.cells.insert(
            index,
            GridCell {
                path: path.clone(),
                thumbnail: Thumbnail::Loading,
            },
        );
        Some(path)
    }

    /// Store a decoded thumbnail on every cell showing `path`
    pub fn set_thumbnail(&mut self, path: &PhotoPath, decoded: Option<DecodedImage>) {
        let thumbnail = match decoded {
            Some(decoded) => Thumbnail::Ready(decoded.handle()),
            None => Thumbnail::Missing,
        };

        for cell in self.cells.iter_mut().filter(|cell| &cell.path == path) {
            cell.thumbnail = thumbnail.clone();
        }
    }

    #[cfg(test)]
    pub fn cells(&self) -> &[GridCell] {
        &self.cells
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn columns(&self) -> u32 {
        self.columns
    }

    /// Recompute the column count for a new width. Returns true if it changed.
    pub fn relayout(&mut self, screen_width: u32) -> bool {
        let columns = layout::columns(screen_width, self.item_width);
        let changed = columns != self.columns;
        self.columns = columns;
        changed
    }

    /// Build the grid: rows of `columns` cells in a vertical scrollable
    pub fn view(&self) -> Element<'_, Message> {
        if self.is_empty() {
            return container(text("No photos yet. Use \"Open camera\" to take one.").size(16))
                .width(Length::Fill)
                .height(Length::Fill)
                .center_x(Length::Fill)
                .center_y(Length::Fill)
                .into();
        }

        let rows = self.cells.chunks(self.columns as usize).map(|chunk| {
            Element::from(
                Row::with_children(chunk.iter().map(|cell| self.cell_view(cell))).spacing(SPACING),
            )
        });

        scrollable(Column::with_children(rows).spacing(SPACING).padding(SPACING))
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }

    fn cell_view<'a>(&'a self, cell: &'a GridCell) -> Element<'a, Message> {
        let size = Length::Fixed(self.item_width as f32);

        let content: Element<Message> = match &cell.thumbnail {
            Thumbnail::Ready(handle) => Image::<Handle>::new(handle.clone())
                .width(size)
                .height(size)
                .content_fit(ContentFit::Cover)
                .into(),
            Thumbnail::Loading => placeholder("…", size),
            Thumbnail::Missing => placeholder("?", size),
        };

        button(content)
            .padding(0)
            .on_press(Message::OpenPhoto {
                photo_path: cell.path.to_string(),
            })
            .into()
    }
}

fn placeholder<'a>(label: &'a str, size: Length) -> Element<'a, Message> {
    container(text(label).size(24))
        .width(size)
        .height(size)
        .center_x(size)
        .center_y(size)
        .into()
}
