//! `map` mode: print a floor without playing it

use cw_core::GenerationOptions;
use cw_core::content::{BuiltinContent, FloorTheme};
use cw_core::dungeon::{Direction, Dungeon, Room, RoomId, RoomType};

fn glyph(room: &Room, current: RoomId) -> char {
    if room.id == current {
        return '@';
    }
    match room.room_type {
        RoomType::None => ' ',
        RoomType::Combat => 'C',
        RoomType::Puzzle => '?',
        RoomType::Treasure => '$',
        RoomType::Trap => '^',
        RoomType::Boss => 'B',
    }
}

/// Render rooms as boxes and corridors as lines; y grows downward
pub fn render(dungeon: &Dungeon) -> String {
    let width = dungeon.width.max(1) as usize;
    let height = dungeon.height.max(1) as usize;
    let mut grid = vec![vec!['.'; width]; height];
    let put = |grid: &mut Vec<Vec<char>>, x: i32, y: i32, c: char| {
        if x >= 0 && y >= 0 && (x as usize) < width && (y as usize) < height {
            grid[y as usize][x as usize] = c;
        }
    };

    for room in dungeon.rooms.values() {
        let inner = glyph(room, dungeon.current_room);
        for y in room.y..room.y + room.height {
            for x in room.x..room.x + room.width {
                let edge = x == room.x
                    || y == room.y
                    || x == room.x + room.width - 1
                    || y == room.y + room.height - 1;
                put(&mut grid, x, y, if edge { '#' } else { inner });
            }
        }
    }

    // Corridors only fill open floor so they never scribble over rooms
    for room in dungeon.rooms.values() {
        let (cx, cy) = room.center();
        for connection in &room.connections {
            let Some(target) = dungeon.room(connection.target) else {
                continue;
            };
            let (tx, ty) = target.center();
            let (dx, dy) = connection.direction.delta();
            let (mut x, mut y) = (cx, cy);
            let mark = match connection.direction {
                Direction::North | Direction::South => '|',
                Direction::East | Direction::West => '-',
            };
            while (x, y) != (tx, ty) && (0..dungeon.width).contains(&x) && (0..dungeon.height).contains(&y) {
                if grid[y as usize][x as usize] == '.' {
                    put(&mut grid, x, y, mark);
                }
                if (dx != 0 && x == tx) || (dy != 0 && y == ty) {
                    break;
                }
                x += dx;
                y += dy;
            }
        }
    }

    grid.into_iter()
        .map(|row| row.into_iter().collect::<String>())
        .collect::<Vec<_>>()
        .join("\n")
}

/// One line per room: id, origin, type and exits
pub fn room_table(dungeon: &Dungeon) -> String {
    let mut lines = vec![format!("{:>4}  {:>9}  {:<9}  exits", "id", "origin", "type")];
    for room in dungeon.rooms.values() {
        let exits = room
            .connections
            .iter()
            .map(|c| format!("{}->{}", c.direction, c.target))
            .collect::<Vec<_>>()
            .join(" ");
        lines.push(format!(
            "{:>4}  {:>9}  {:<9}  {exits}",
            room.id.to_string(),
            format!("({},{})", room.x, room.y),
            room.room_type.to_string(),
        ));
    }
    lines.join("\n")
}

pub fn run(options: &GenerationOptions) -> Result<(), Box<dyn std::error::Error>> {
    let theme = FloorTheme::for_level(options.level);
    let dungeon = Dungeon::generate(options, &theme, &BuiltinContent)?;

    println!("Floor {} ({}) seed {}", dungeon.level, theme.name, dungeon.seed);
    println!("{}", render(&dungeon));
    println!();
    println!("{}", room_table(&dungeon));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn floor(rooms: usize) -> Dungeon {
        Dungeon::generate(
            &GenerationOptions::seeded("map", rooms),
            &FloorTheme::for_level(1),
            &BuiltinContent,
        )
        .unwrap()
    }

    #[test]
    fn test_render_marks_start_and_boss() {
        let dungeon = floor(8);
        let text = render(&dungeon);
        assert_eq!(text.lines().count(), dungeon.height as usize);
        assert!(text.lines().all(|l| l.chars().count() == dungeon.width as usize));
        assert!(text.contains('@'));
        assert!(text.contains('B'));
    }

    #[test]
    fn test_room_table_lists_every_room() {
        let dungeon = floor(6);
        let table = room_table(&dungeon);
        assert_eq!(table.lines().count(), 7);
        assert!(table.contains("boss"));
    }
}
