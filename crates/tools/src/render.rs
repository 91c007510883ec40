//! ASCII rendering of a level for terminal inspection.

use delve::visibility::VisibilityMap;
use delve::{Grid, Pos, ShopKind, Stationary, Terrain, Tile};

pub struct Overlay<'a> {
    pub viewer: Option<Pos>,
    pub visibility: Option<&'a VisibilityMap>,
    pub route: &'a [Pos],
}

pub fn render_level(grid: &Grid, overlay: &Overlay<'_>) -> String {
    let mut text = String::with_capacity((grid.width() + 1) * grid.height());
    for y in 0..grid.height() as i32 {
        for x in 0..grid.width() as i32 {
            let pos = Pos { y, x };
            let hidden = overlay.visibility.is_some_and(|map| !map.is_visible(pos));
            let glyph = if overlay.viewer == Some(pos) {
                '@'
            } else if hidden {
                ' '
            } else if overlay.route.contains(&pos) {
                '*'
            } else {
                tile_glyph(grid.get(pos))
            };
            text.push(glyph);
        }
        text.push('\n');
    }
    text
}

fn tile_glyph(tile: &Tile) -> char {
    if tile.occupant.is_some() {
        return 'm';
    }
    if let Some(stationary) = tile.stationary {
        return stationary_glyph(stationary);
    }
    if tile.trap.is_some() {
        return '^';
    }
    match tile.terrain {
        Terrain::Wall => '#',
        Terrain::Floor => '.',
        Terrain::Water => '~',
        Terrain::Lava => '=',
        Terrain::Fire => '%',
        Terrain::Cloud => ':',
    }
}

fn stationary_glyph(stationary: Stationary) -> char {
    match stationary {
        Stationary::Entrance => 'E',
        Stationary::StairsUp => '<',
        Stationary::StairsDown => '>',
        Stationary::Elevator => 'V',
        Stationary::Altar => 'A',
        Stationary::Fountain => 'F',
        Stationary::Statue => 'S',
        Stationary::Throne => 'T',
        Stationary::Mirror => 'M',
        Stationary::ClosedDoor => '+',
        Stationary::OpenDoor => '\'',
        Stationary::Shop(shop) => match shop {
            ShopKind::Home => '1',
            ShopKind::GeneralStore => '2',
            ShopKind::Bank => '3',
            ShopKind::College => '4',
            ShopKind::TradingPost => '5',
            ShopKind::TaxOffice => '6',
        },
    }
}
