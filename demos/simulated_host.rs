use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::sync::Arc;

use recycler::{
    ContentElement, ElementSlot, FrameId, Host, MeasuredElement, Model, RenderOutput, Rendered,
    Scheduler, ScrollRoot, VirtualList, VirtualListOptions,
};

// A toy host: one scroll container, rows whose real height depends on their text.

struct Row {
    id: u64,
    text: String,
}

impl Model for Row {
    type Id = u64;

    fn id(&self) -> u64 {
        self.id
    }
}

#[derive(Debug)]
struct Label {
    id: u64,
    text: String,
}

impl RenderOutput<Row> for Label {
    fn update_model(&mut self, model: &Arc<Row>) {
        self.text = model.text.clone();
    }
}

#[derive(Clone)]
struct RowBox {
    height: u32,
}

impl MeasuredElement for RowBox {
    fn size(&self) -> u32 {
        self.height
    }

    fn margin_start(&self) -> u32 {
        2
    }
}

#[derive(Clone, Default)]
struct Window(Rc<RefCell<(u64, bool)>>);

impl ScrollRoot for Window {
    fn scroll_position(&self) -> u64 {
        self.0.borrow().0
    }

    fn viewport_size(&self) -> u32 {
        600
    }

    fn scroll_to(&mut self, position: u64) {
        *self.0.borrow_mut() = (position, true);
    }
}

struct Body;

impl ContentElement for Body {
    fn offset_from_root(&self) -> u32 {
        48
    }
}

#[derive(Default)]
struct EventLoop {
    next_frame: FrameId,
    frames: VecDeque<FrameId>,
    microtasks: usize,
}

impl Scheduler for EventLoop {
    fn request_animation_frame(&mut self) -> FrameId {
        self.next_frame += 1;
        self.frames.push_back(self.next_frame);
        self.next_frame
    }

    fn cancel_animation_frame(&mut self, id: FrameId) {
        self.frames.retain(|f| *f != id);
    }

    fn queue_microtask(&mut self) {
        self.microtasks += 1;
    }
}

struct Toy;

impl Host for Toy {
    type Root = Window;
    type Content = Body;
    type Element = RowBox;
    type Scheduler = EventLoop;
}

fn settle(list: &mut VirtualList<Row, Toy, Label>, window: &Window, now_ms: u64) {
    loop {
        if list.scheduler().microtasks > 0 {
            list.scheduler_mut().microtasks -= 1;
            list.run_microtasks();
            continue;
        }
        if std::mem::take(&mut window.0.borrow_mut().1) {
            list.on_scroll(now_ms);
            continue;
        }
        let Some(frame) = list.scheduler_mut().frames.pop_front() else {
            return;
        };
        if let Err(err) = list.on_animation_frame(frame) {
            eprintln!("frame {frame}: {err}");
        }
    }
}

fn main() {
    let rows: Vec<Arc<Row>> = (0..10_000)
        .map(|id| {
            Arc::new(Row {
                id,
                text: "lorem ipsum ".repeat((id % 7 + 1) as usize),
            })
        })
        .collect();

    let options = VirtualListOptions::new(
        |row: &Arc<Row>, _index: usize, slot: &mut ElementSlot<RowBox>| {
            // 20px per started line of 40 chars.
            let lines = row.text.len().div_ceil(40) as u32;
            slot.bind(RowBox { height: lines * 20 });
            Rendered::new(Label {
                id: row.id,
                text: row.text.clone(),
            })
        },
    )
    .with_models(rows)
    .with_render_beyond_fold(200);

    let window = Window::default();
    let mut list: VirtualList<Row, Toy, Label> = VirtualList::new(options, EventLoop::default());
    list.set_root_element(window.clone());
    if let Err(err) = list.set_content_element(Body) {
        eprintln!("bind failed: {err}");
        return;
    }
    settle(&mut list, &window, 0);
    report(&list, "initial");

    for (step, position) in [2_000u64, 50_000, 49_000].into_iter().enumerate() {
        let now_ms = 16 * (step as u64 + 1);
        window.0.borrow_mut().0 = position;
        list.on_scroll(now_ms);
        settle(&mut list, &window, now_ms);
        report(&list, &format!("scrolled to {position}"));
    }

    list.update_scrolling(1_000);
    println!("is_scrolling={}", list.is_scrolling());
    list.teardown();
}

fn report(list: &VirtualList<Row, Toy, Label>, label: &str) {
    let ids: Vec<u64> = list.items().map(|l| l.id).collect();
    println!(
        "{label}: scroll={} content_height={} items_top={} rendered={:?}..={:?} ({} items, last cycle {:?})",
        list.scroll().scroll_position(),
        list.content_height(),
        list.items_top(),
        ids.first(),
        ids.last(),
        ids.len(),
        list.last_cycle(),
    );
    if let Some(first) = list.items().next() {
        println!("  first row text: {:?}", first.text.trim_end());
    }
}
